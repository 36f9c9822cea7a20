use anyhow::Result;

fn main() -> Result<()> {
    sourcing_cli::main_entry()
}
