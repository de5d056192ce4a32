//! Argument parsing for the `bo` binary.
//!
//! The entry points are [`parse_args`] (reads `std::env::args()`) and
//! [`parse_args_from`] (takes an explicit slice, suitable for unit tests).
//! Short options may be aggregated (`-nv`); `-i` and `-o` take their value
//! either attached (`-ifile`) or as the next argument. A bare `--` ends
//! option processing. Everything else is a positional command string,
//! processed by the engine in order before any `-i` files.
//!
//! Bad or unrecognised options return an `Err` whose message begins with
//! `"bad usage: "`.

use anyhow::anyhow;

use crate::cli::help::{print_usage, print_version};

/// Everything the argument loop discovered.
#[derive(Debug, Default)]
pub struct ParsedArgs {
    /// `-i` files in order; `-` means stdin.
    pub input_files: Vec<String>,
    /// `-o` target; `None` or `-` means stdout. Last one wins.
    pub output_file: Option<String>,
    /// `-n`: write a newline after the final flush.
    pub trailing_newline: bool,
    /// Positional command/data strings, processed before any input file.
    pub commands: Vec<String>,
    /// A `-v` or `-h` was handled; the caller should exit 0 without
    /// processing anything.
    pub exit_early: bool,
}

/// Parse `std::env::args()` (skipping argv[0]).
pub fn parse_args() -> anyhow::Result<ParsedArgs> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&argv)
}

/// Parse an explicit argument list. Callable from tests without touching
/// `std::env`.
pub fn parse_args_from(argv: &[String]) -> anyhow::Result<ParsedArgs> {
    let mut args = ParsedArgs::default();
    let mut options_done = false;

    let mut index = 0;
    while index < argv.len() {
        let argument = &argv[index];
        index += 1;

        if options_done || !argument.starts_with('-') || argument == "-" {
            args.commands.push(argument.clone());
            continue;
        }
        if argument == "--" {
            options_done = true;
            continue;
        }

        // Walk the flag characters; `i` and `o` consume the rest of the
        // argument (or the next one) as their value.
        let flags = &argument[1..];
        let mut chars = flags.char_indices();
        while let Some((at, flag)) = chars.next() {
            match flag {
                'i' | 'o' => {
                    let rest = &flags[at + 1..];
                    let value = if !rest.is_empty() {
                        rest.to_owned()
                    } else if index < argv.len() {
                        index += 1;
                        argv[index - 1].clone()
                    } else {
                        return Err(anyhow!("bad usage: -{flag} requires a filename argument"));
                    };
                    if flag == 'i' {
                        args.input_files.push(value);
                    } else {
                        args.output_file = Some(value);
                    }
                    break;
                }
                'n' => args.trailing_newline = true,
                'v' => {
                    print_version();
                    args.exit_early = true;
                }
                'h' => {
                    print_version();
                    print_usage();
                    args.exit_early = true;
                }
                other => {
                    return Err(anyhow!("bad usage: unknown option: -{other}"));
                }
            }
        }
    }

    Ok(args)
}
