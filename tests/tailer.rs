use rlpager::file_handler::{
    Generation, IndexedFile, LineSource, Readiness, SharedLineIndex, TailEvent, Tailer,
};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tokio::time::{sleep, timeout, Duration, Instant};

const POLL: Duration = Duration::from_millis(10);

async fn wait_for_lines(index: &SharedLineIndex, count: u64) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while index.line_count() != count {
        assert!(
            Instant::now() < deadline,
            "index stuck at {} lines, wanted {}",
            index.line_count(),
            count
        );
        sleep(POLL).await;
    }
}

fn append(path: &Path, text: &str) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
}

#[tokio::test]
async fn tailer_indexes_growth_and_signals_ready() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("growing.log");
    std::fs::write(&path, "one\ntwo\n").unwrap();

    let index = SharedLineIndex::new(2048);
    let generation = Generation::new();
    let mut handle = Tailer::new(&path, index.clone(), POLL, generation.clone())
        .wanted_lines(3)
        .spawn();

    let ready = timeout(Duration::from_secs(5), handle.ready.take().unwrap())
        .await
        .expect("readiness timed out")
        .unwrap();
    assert_eq!(ready, Readiness::Ready);
    wait_for_lines(&index, 3).await;

    // an unterminated line is not indexed until its newline arrives
    append(&path, "thr");
    sleep(POLL * 5).await;
    assert_eq!(index.line_count(), 3);
    append(&path, "ee\n\tfour\n");
    wait_for_lines(&index, 5).await;

    let source = IndexedFile::new(std::fs::File::open(&path).unwrap(), index.clone(), 8);
    assert_eq!(source.read_line(3).as_deref(), Some("three"));
    assert_eq!(source.read_line(4).as_deref(), Some("    four"));

    generation.advance();
    timeout(Duration::from_secs(5), handle.task)
        .await
        .expect("tailer did not retire")
        .unwrap();
}

#[tokio::test]
async fn shrinking_file_resets_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rotated.log");
    std::fs::write(&path, "alpha\nbeta\ngamma\n").unwrap();

    let index = SharedLineIndex::new(2048);
    let generation = Generation::new();
    let mut handle = Tailer::new(&path, index.clone(), POLL, generation.clone()).spawn();
    wait_for_lines(&index, 4).await;

    let source = IndexedFile::new(std::fs::File::open(&path).unwrap(), index.clone(), 8);
    assert_eq!(source.read_line(2).as_deref(), Some("beta"));

    std::fs::write(&path, "").unwrap();
    let event = timeout(Duration::from_secs(5), handle.events.recv())
        .await
        .expect("no truncation notice")
        .unwrap();
    assert!(matches!(event, TailEvent::Truncated { new_size: 0, .. }));
    assert_eq!(index.line_count(), 1);
    assert_eq!(source.read_line(2), None);

    // repopulated from the start of the file
    append(&path, "delta\n");
    wait_for_lines(&index, 2).await;
    assert_eq!(source.read_line(1).as_deref(), Some("delta"));

    generation.advance();
}
