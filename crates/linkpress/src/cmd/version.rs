use crate::cmd::VersionArgs;
use crate::exit::{self, CliResult};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    let version = env!("CARGO_PKG_VERSION");
    if args.short {
        println!("{version}");
    } else {
        println!("linkpress {version}");
    }
    Ok(exit::SUCCESS)
}
