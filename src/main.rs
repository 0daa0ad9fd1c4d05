fn main() -> anyhow::Result<()> {
    brrtrouter_cors::cli::run_cli()
}
