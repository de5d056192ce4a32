//! Binary entry point for the `bo` command-line tool.
//!
//! Wires the streaming engine to files and stdio: positional arguments are
//! joined and processed first as one terminal segment; `-i` files are then
//! streamed in chunks with the engine's unconsumed tail carried to the head
//! of the next read, so tokens and quoted strings may span read boundaries
//! freely.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, Read, Write};

use bo::cli::args::{parse_args, ParsedArgs};
use bo::{Context, DataSegment};

/// File read granularity. A token larger than this grows the carry buffer.
const CHUNK_SIZE: usize = 8192;

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(error) => {
            eprintln!("bo: {error}");
            eprintln!("Use bo -h for help.");
            std::process::exit(1);
        }
    };

    if args.exit_early {
        std::process::exit(0);
    }

    if args.commands.is_empty() && args.input_files.is_empty() {
        eprintln!("bo: must specify input commands and/or an input file");
        eprintln!("Use bo -h for help.");
        std::process::exit(1);
    }

    std::process::exit(run(args));
}

/// Execute the translation session. Returns the process exit code.
fn run(args: ParsedArgs) -> i32 {
    let out_stream: Box<dyn Write> = match args.output_file.as_deref() {
        None | Some("-") => Box::new(io::stdout()),
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(file),
            Err(error) => {
                eprintln!("bo: could not open {path} for writing: {error}");
                return 1;
            }
        },
    };
    let writer = RefCell::new(io::BufWriter::new(out_stream));

    let mut succeeded = {
        let mut ctx = Context::new(
            |bytes| writer.borrow_mut().write_all(bytes).is_ok(),
            |message| eprintln!("Error: {message}"),
        );

        // Positional arguments form one command stream, joined the same way
        // the shell split them. The trailing newline terminates a final
        // command token.
        let mut failed = false;
        if !args.commands.is_empty() {
            let mut chunk = args.commands.join(" ").into_bytes();
            chunk.push(b'\n');
            failed = ctx.process(&mut chunk, DataSegment::Last).is_none();
        }

        if !failed {
            for path in &args.input_files {
                match feed_file(&mut ctx, path) {
                    Ok(true) => {}
                    Ok(false) => {
                        failed = true;
                        break;
                    }
                    Err(error) => {
                        eprintln!("bo: {path}: {error}");
                        failed = true;
                        break;
                    }
                }
            }
        }

        let flushed = ctx.finish();
        !failed && flushed
    };

    if args.trailing_newline && writer.borrow_mut().write_all(b"\n").is_err() {
        succeeded = false;
    }
    if writer.borrow_mut().flush().is_err() {
        eprintln!("bo: error writing to output stream");
        succeeded = false;
    }

    if succeeded {
        0
    } else {
        1
    }
}

fn feed_file(ctx: &mut Context<'_>, path: &str) -> io::Result<bool> {
    if path == "-" {
        let stdin = io::stdin();
        feed_reader(ctx, stdin.lock())
    } else {
        feed_reader(ctx, File::open(path)?)
    }
}

/// Stream a reader through the engine in chunks, honoring the carry
/// contract: the unconsumed tail of each `process` call is moved to the
/// front of the buffer and topped up with the next read. End of file feeds
/// the remaining carry (possibly empty) as the terminal segment.
fn feed_reader<R: Read>(ctx: &mut Context<'_>, mut reader: R) -> io::Result<bool> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut carry = 0usize;

    loop {
        if carry == buf.len() {
            // One token spans more than the whole buffer; make room.
            buf.resize(buf.len() * 2, 0);
        }
        let bytes_read = match reader.read(&mut buf[carry..]) {
            Ok(n) => n,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        if bytes_read == 0 {
            return Ok(ctx
                .process(&mut buf[..carry], DataSegment::Last)
                .is_some());
        }

        let total = carry + bytes_read;
        let Some(consumed) = ctx.process(&mut buf[..total], DataSegment::Stream) else {
            return Ok(false);
        };
        buf.copy_within(consumed..total, 0);
        carry = total - consumed;
    }
}
