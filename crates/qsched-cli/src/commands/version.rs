//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - course scheduling as QUBO / Ising and integer programs",
        style("qsched").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qsched-catalog  Sections, meeting times, rooms and the weekly grid");
    println!("  qsched-qubo     Section selection as QUBO / Ising / cost Hamiltonian");
    println!("  qsched-ilp      Meeting placement as a binary integer program");
    println!("  qsched-cli      Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
