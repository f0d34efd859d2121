// SPDX-License-Identifier: MPL-2.0
use iced_detect::app::{self, Flags};
use std::path::PathBuf;

const HELP: &str = "\
iced_detect

USAGE:
  iced_detect [OPTIONS] [FILES]...

OPTIONS:
  --lang <LOCALE>            UI language (e.g. en-US, ru)
  --server-url <URL>         Detection server base URL
  --config-dir <DIR>         Directory holding settings.toml
  --diagnostics-out <FILE>   Write a diagnostics report on exit
  -h, --help                 Print this help
";

fn main() -> iced::Result {
    let mut args = pico_args::Arguments::from_env();

    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let flags = Flags {
        lang: args.opt_value_from_str("--lang").unwrap_or(None),
        server_url: args.opt_value_from_str("--server-url").unwrap_or(None),
        config_dir: args.opt_value_from_str("--config-dir").unwrap_or(None),
        diagnostics_out: args
            .opt_value_from_os_str("--diagnostics-out", |s| {
                Ok::<_, std::convert::Infallible>(PathBuf::from(s))
            })
            .unwrap_or(None),
        files: args.finish().into_iter().map(PathBuf::from).collect(),
    };

    app::run(flags)
}
