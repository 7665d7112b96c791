use clap::{arg,crate_version,value_parser,Command};
use ablzw::lzw;

const RCH: &str = "unreachable was reached";

fn main() -> Result<(),Box<dyn std::error::Error>>
{
    env_logger::init();

    let long_help =
"Examples:
---------
Compress:      `ablzw compress -x 16 -i my_expanded -o my_compressed`
Expand:        `ablzw expand -i my_compressed -o my_expanded`";

    let mut main_cmd = Command::new("ablzw")
        .about("Compress and expand with adjusted-binary LZW")
        .after_long_help(long_help)
        .version(crate_version!());
    main_cmd = main_cmd.subcommand(Command::new("compress")
        .arg(arg!(-x --maxbits [BITS] "maximum code width in bits")
            .value_parser(value_parser!(u8).range(9..=16))
            .default_value("16"))
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("compress a file"));

    main_cmd = main_cmd.subcommand(Command::new("expand")
        .arg(arg!(-i --input <PATH> "input path").required(true))
        .arg(arg!(-o --output <PATH> "output path").required(true))
        .about("expand a file"));

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let max_bits = *cmd.get_one::<u8>("maxbits").expect(RCH) as usize;
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::File::create(path_out)?;
        let (in_size,out_size) = lzw::compress(&mut in_file,&mut out_file,max_bits)?;
        eprintln!("compressed {} into {}",in_size,out_size);
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        let mut in_file = std::fs::File::open(path_in)?;
        let mut out_file = std::fs::File::create(path_out)?;
        let (in_size,out_size) = lzw::expand(&mut in_file,&mut out_file)?;
        eprintln!("expanded {} into {}",in_size,out_size);
    }

    Ok(())
}
