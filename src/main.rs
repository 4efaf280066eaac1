use std::path::Path;

use protein_eda::config::INPUT_FILE;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let stdout = std::io::stdout();
    protein_eda::run(Path::new(INPUT_FILE), Path::new("."), &mut stdout.lock())?;
    Ok(())
}
