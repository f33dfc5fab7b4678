use minish::{Interpreter, LineEditor};
use std::io;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut editor = LineEditor::stdio();
    let mut sh = Interpreter::default();
    log::info!("starting in {}", sh.env().current_dir.display());

    let code = sh.repl(&mut editor, &mut io::stdout(), &mut io::stderr())?;
    std::process::exit(code)
}
