//! `baily version` command implementation.

use baily_bridge::VERSION;
use miette::Result;

/// Print version information.
pub fn run(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "version": VERSION }));
    } else {
        println!("baily {VERSION}");
    }
    Ok(())
}
