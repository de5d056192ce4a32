//! Usage and version text for the `bo` binary.

use crate::BO_VERSION;

const USAGE: &str = "\
Usage: bo [options] command [command] ...

The default is to read commands from cmdline arguments and print output to stdout.

Options:
    -i [filename]: Read commands/data from a file (use \"-\" to read from stdin).
    -o [filename]: Write output to a file (use \"-\" to write to stdout).
    -n           : Write a newline after processing is complete.
    -v           : Print version and exit.
    -h           : Print help and exit.

Commands:
    i{type}{data width}{endianness}: Specify how to interpret input data
    o{type}{data width}{endianness}{print width}: Specify how to re-interpret data and how to print it
    p{string}: Specify a prefix to prepend to each datum output
    s{string}: Specify a suffix to append to each datum output (except for the last datum)
    P{type}: Specify a preset for prefix and suffix.

Types:
    i: Integer in base 10
    h: Integer in base 16
    o: Integer in base 8
    b: Integer in base 2
    f: IEEE 754 binary floating point
    d: IEEE 754 decimal floating point
    s: C-style string (including escaping). This type does not use widths or endianness.
    B: Data is interpreted or output using its binary representation rather than text.

Data Widths:
    1 byte  (8-bit)
    2 bytes (16-bit)
    4 bytes (32-bit)
    8 bytes (64-bit)
    16 bytes (128-bit)

Endianness:
    l: Little Endian
    b: Big Endian

Print Width:
    Any integer representing the minimum number of digits to print.
    For floating point, the number of digits after the decimal point.

Presets:
    c: C-style preset: \", \" suffix, 0x prefix for hexadecimal, 0 prefix for octal.
    s: Space preset: \" \" suffix.

Notes:
    Presets must be applied AFTER setting the output type.
    A single command line argument may contain multiple commands.

Example: Convert the string \"Testing\" to its hex representation using the \"space\" preset:
    bo 'oh1l2 Ps ih1l \"Testing\"'

Example: Convert the 32-bit float 1.5 to its little endian hex representation using the \"C\" preset:
    bo oh1l2 if4l Pc 1.5
";

pub fn print_version() {
    println!("Bo version {BO_VERSION}");
}

pub fn print_usage() {
    print!("\n{USAGE}");
}
