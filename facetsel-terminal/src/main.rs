//! facetsel - select whole faces of STL meshes from the terminal
//!
//! Examples:
//!   facetsel info trophy.stl
//!   facetsel grow trophy.stl --seed 120 --angle 5
//!   facetsel pick trophy.stl --origin 0,0,50 --direction 0,0,-1 --json

use clap::Parser;
use facetsel_terminal::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    facetsel_terminal::run(cli)
}
