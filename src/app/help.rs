use crate::file_handler::InMemoryLines;

pub const HELP_TITLE: &str = "Help";

const HELP_TEXT: &str = "\
Moving
  j  Down  Enter  ^E  ^N    forward one line
  k  Up  ^Y  ^P             backward one line
  Space  f  PgDn  ^F        forward one page
  b  PgUp  ^B               backward one page
  d  ^D                     forward half a page
  u  ^U                     backward half a page
  g  Home                   go to the start of the file
  G  End                    go to the end of the file
  :                         go to a line number

Horizontal
  >  Right                  shift right
  <  Left                   shift left
  ^                         shift back to column 0
  $                         shift so the longest visible line ends on screen

Scroll modes (the same key again stops)
  c                         scroll down continuously
  C                         scroll up continuously
  t                         tail: keep the last page on screen
  F                         follow: scroll line by line as the file grows

Marks
  m<1-9>                    set a mark at the top line
  '<1-9>  1-9               go to a mark

Searching
  /pattern                  search forward
  ?pattern                  search backward
  n                         repeat the search
  N                         repeat the search in the other direction
  i                         toggle case sensitivity
  p                         show the current pattern
  P                         clear the current pattern
  A pattern starting with (?i) is always case-insensitive.

Files
  e                         open a file (% is the current file, ~ is home)
  |                         run a command on a terminal (% is the current file)
  =                         file information
  #                         toggle line numbers
  ^L                        redraw the screen
  x                         next file, saving the session
  X                         next file without saving
  q                         quit, saving the session
  Q                         quit without saving

Space pages through this text; any other key returns.
";

/// Key summary shown by the help command
pub fn help_lines() -> InMemoryLines {
    InMemoryLines::from_text(HELP_TEXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_handler::LineSource;

    #[test]
    fn test_help_mentions_every_group() {
        let help = help_lines();
        let text: Vec<String> = (1..help.line_count())
            .filter_map(|n| help.read_line(n))
            .collect();
        for heading in ["Moving", "Horizontal", "Scroll modes", "Marks", "Searching", "Files"] {
            assert!(text.iter().any(|line| line.starts_with(heading)), "{}", heading);
        }
    }
}
