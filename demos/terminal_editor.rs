// A small terminal front end for the editor, which edits a LaTeX file on disk.
//
// Type to insert text, `/` to insert a fraction (or a limit after typing `lim`), and Tab to move
// forward through a construct's regions. Backspace deletes. Edits are written back to the file
// once typing pauses.
// If the file is changed by something else while the editor is open, the editor picks up the new
// contents. Esc or Ctrl-Q quits, writing out anything still pending.

use std::error::Error;
use std::fs;
use std::io::{Write, stdout};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use termion::event::Key as TermKey;
use termion::input::TermRead;
use termion::raw::IntoRawMode;
use web_time::Instant;

use mathslate::{EditSync, EditorConfig, Host, Intent, Key, Serializable, error::HostError};

/// A host whose document is a file.
struct FileHost {
    path: PathBuf,
    last_preview: String,
}

impl Host for FileHost {
    fn text(&self) -> String {
        fs::read_to_string(&self.path).unwrap_or_default()
    }

    fn replace_text(&mut self, text: &str) -> Result<(), HostError> {
        fs::write(&self.path, text)?;
        Ok(())
    }

    fn insert_at_caret(&mut self, literal: &str) -> Result<(), HostError> {
        let mut file = fs::OpenOptions::new().append(true).create(true).open(&self.path)?;
        file.write_all(literal.as_bytes())?;
        Ok(())
    }

    fn show_preview(&mut self, latex: &str) -> Result<(), HostError> {
        self.last_preview = latex.to_string();
        Ok(())
    }
}

fn map_key(key: TermKey) -> Key {
    match key {
        TermKey::Char('\t') => Key::Tab,
        TermKey::Backspace => Key::Backspace,
        TermKey::Char(c) => Key::Char(c),
        _ => Key::Other,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: terminal_editor <file.tex> [config.json]")?;
    let config = match std::env::args().nth(2) {
        Some(config_path) => EditorConfig::from_json(&fs::read_to_string(config_path)?)?,
        None => EditorConfig::default(),
    };
    let trigger = config.trigger;

    let host = FileHost { path, last_preview: String::new() };
    let mut sync = EditSync::open(host, config, tracing::info_span!("terminal_editor"));

    let mut stdout = stdout().into_raw_mode()?;
    let mut keys = termion::async_stdin().keys();
    let mut needs_draw = true;
    let mut on_disk = sync.host().text();

    loop {
        // Drain whatever has been typed since the last pass
        let mut quit = false;
        while let Some(key) = keys.next() {
            match key? {
                TermKey::Esc | TermKey::Ctrl('q') => { quit = true; break; }
                key => {
                    if let Some(intent) = Intent::from_key(map_key(key), trigger) {
                        sync.apply(intent, Instant::now());
                        needs_draw = true;
                    }
                }
            }
        }
        if quit {
            break;
        }

        if let Err(err) = sync.poll(Instant::now()) {
            write!(stdout, "{}write failed: {}\r\n", termion::cursor::Goto(1, 6), err)?;
        }

        // Pick up changes made to the file by anything else
        let current = sync.host().text();
        if current != on_disk {
            needs_draw |= sync.on_host_text_changed(&current);
            on_disk = current;
        }

        if needs_draw {
            write!(stdout, "{}{}", termion::cursor::Goto(1, 1), termion::clear::All)?;
            write!(stdout, "{}\r\n", sync.document().serialize())?;
            write!(stdout, "\r\n===================================\r\n")?;
            write!(stdout, "{:?}  {:?}\r\n", sync.focus_state(), sync.caret())?;
            write!(stdout, "preview: {}\r\n", sync.host().last_preview)?;
            stdout.flush()?;
            needs_draw = false;
        }

        thread::sleep(Duration::from_millis(20));
    }

    sync.flush()?;
    write!(stdout, "\r\n")?;
    Ok(())
}
