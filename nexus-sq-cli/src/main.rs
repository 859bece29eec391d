mod cli;
mod command;
mod session;

use std::fs::File;
use std::io::{self, BufReader, Write};

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use log::info;
use nexus_sq::ServiceQueue;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut queue = match cli.capacity {
        Some(capacity) => ServiceQueue::with_capacity(capacity as usize),
        None => ServiceQueue::new(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if !cli.quiet {
        out.write_all(session::BANNER.as_bytes())
            .context("failed to write banner")?;
    }

    match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            info!("running commands from {}", path.display());
            session::run(&mut queue, BufReader::new(file), &mut out, false)?;
        }
        None => session::run(&mut queue, io::stdin().lock(), &mut out, !cli.quiet)?,
    }

    info!(
        "{} buzzer(s) issued, {} still in line",
        queue.issued(),
        queue.len()
    );
    Ok(())
}
