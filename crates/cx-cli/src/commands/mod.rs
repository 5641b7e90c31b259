pub mod find;
pub mod generate;
pub mod parse;
pub mod render;
pub mod schema;
pub mod tokens;

use crate::cli::{Commands, GlobalFlags};

/// Dispatch a parsed command to the corresponding handler module.
pub fn dispatch(command: &Commands, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Generate(args) => generate::handle(args, flags),
        Commands::Parse(args) => parse::handle(args, flags),
        Commands::Find(args) => find::handle(args, flags),
        Commands::Render(args) => render::handle(args, flags),
        Commands::Tokens(args) => tokens::handle(args, flags),
        Commands::Schema(args) => schema::handle(args, flags),
    }
}
