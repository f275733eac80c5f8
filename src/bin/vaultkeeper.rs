use vaultkeeper::cli;

fn output_header() -> &'static str {
    "Vaultkeeper\nVaultkeeper is a file-backed task queue with a human approval gate for sensitive actions."
}

fn print_header() {
    println!("{}\n", output_header());
}

fn run() -> Result<(), String> {
    print_header();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = cli::run(args)?;
    println!("{output}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
