use phasegate::app::run_cli;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let output = run_cli(&args, std::io::stdin().lock());
    if let Some(stdout) = output.stdout {
        println!("{stdout}");
    }
    if let Some(stderr) = output.stderr {
        eprintln!("{stderr}");
    }
    std::process::exit(output.exit_code);
}
