//! Leave the terminal usable when folio exits, cleanly or not

use std::io::{self, Write};
use std::panic;

use crossterm::cursor::Show;
use crossterm::event::DisableMouseCapture;
use crossterm::execute;
use crossterm::terminal::{LeaveAlternateScreen, disable_raw_mode};

/// Pretty backtraces, with the terminal restored before they are printed
pub fn initialize_panic_handler() {
    better_panic::install();

    let report = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        match info.location() {
            Some(at) => log::error!("Panic at {}:{}: {info}", at.file(), at.line()),
            None => log::error!("Panic: {info}"),
        }
        report(info);
        std::process::exit(1);
    }));
}

/// Undo raw mode, the alternate screen and mouse capture.
///
/// Errors are ignored: this also runs from the panic hook, where the
/// terminal may already be half torn down.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show);
    let _ = writeln!(io::stderr());
}
