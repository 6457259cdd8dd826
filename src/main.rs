use std::ffi::OsString;

use clap::{clap_app, App, ArgMatches, ErrorKind};

/// Short options taking a value; the rest of a bundle is that value.
const SHORT_OPTIONS: &[char] = &['s'];
/// Options whose value is the next argument when not attached.
const VALUE_OPTIONS: &[&str] = &["-s", "--set", "--server"];

/// What the command line asks for.
enum Parsed<'a> {
    /// Print these diagnostics, then usage, and exit successfully.
    Usage(Vec<String>),
    Run(ArgMatches<'a>),
}

fn main() {
    let code = match parse(std::env::args_os()) {
        Parsed::Usage(diagnostics) => {
            for line in diagnostics {
                eprintln!("{}", line);
            }
            usage();
            0
        }
        Parsed::Run(matches) => {
            if let Err(e) = audioswitch::init_logging(matches.is_present("VERBOSE")) {
                eprintln!("{}", e);
            }
            execute(&matches)
        }
    };
    if code != 0 {
        std::process::exit(code);
    }
}

fn app() -> App<'static, 'static> {
    clap_app!(
        audioswitch =>
            (about: "List audio sinks and switch the default one.")
            (after_help: "Sink identifiers can match the index, or a case insensitive \
                          substring of the name or description (literal match with --exact).")
            (@setting AllowLeadingHyphen)
            (@setting DisableVersion)
            (@setting ColorNever)
            (@arg LIST: -l --list "show available sinks")
            (@arg INFO: -i --info "show server name, version and default sink")
            (@arg SET: -s --set +takes_value !empty_values "set new default sink")
            (@arg EXACT: -e --exact "require sink identifier to match exactly")
            (@arg SERVER: --server +takes_value "connect to this server instead of the default")
            (@arg VERBOSE: -v --verbose "log protocol activity to stderr")
            (@arg EXTRA: ... +hidden "")
    )
}

fn usage() {
    let _ = app().write_help(&mut std::io::stderr());
    eprintln!();
}

fn parse<I, T>(args: I) -> Parsed<'static>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = split_short_flags(args.into_iter().map(Into::into).collect());
    if args.len() <= 1 {
        return Parsed::Usage(Vec::new());
    }

    let matches = match app().get_matches_from_safe(args) {
        Ok(m) => m,
        Err(e) if e.kind == ErrorKind::HelpDisplayed => return Parsed::Usage(Vec::new()),
        Err(e) => {
            let first = e.message.lines().next().unwrap_or_default();
            let first = first.strip_prefix("error: ").unwrap_or(first);
            return Parsed::Usage(vec![first.to_owned()]);
        }
    };

    let diagnostics = unknown_arguments(&matches);
    if diagnostics.is_empty() {
        Parsed::Run(matches)
    } else {
        Parsed::Usage(diagnostics)
    }
}

/// Split bundles like `-lx` into `-l -x`, so a known flag is not lost to an
/// unknown one. A value option ends the bundle and keeps the rest as its value.
fn split_short_flags(args: Vec<OsString>) -> Vec<OsString> {
    let mut out = Vec::with_capacity(args.len());
    let mut takes_value = false;
    let mut rest_positional = false;
    for (i, arg) in args.into_iter().enumerate() {
        let text = match arg.to_str() {
            Some(t) if i > 0 && !takes_value && !rest_positional => t.to_owned(),
            _ => {
                takes_value = false;
                out.push(arg);
                continue;
            }
        };
        takes_value = VALUE_OPTIONS.contains(&text.as_str());
        if text == "--" {
            rest_positional = true;
        }
        if text.len() <= 2 || !text.starts_with('-') || text.starts_with("--") {
            out.push(arg);
            continue;
        }

        for (at, c) in text[1..].char_indices() {
            if SHORT_OPTIONS.contains(&c) {
                let rest = &text[1 + at..];
                // a bare trailing option takes the next argument
                takes_value = rest.len() == c.len_utf8();
                out.push(OsString::from(format!("-{}", rest)));
                break;
            }
            out.push(OsString::from(format!("-{}", c)));
        }
    }
    out
}

/// One diagnostic line per stray option or argument.
fn unknown_arguments(matches: &ArgMatches) -> Vec<String> {
    matches
        .values_of_lossy("EXTRA")
        .unwrap_or_default()
        .into_iter()
        .map(|arg| {
            if arg.starts_with('-') {
                format!("unknown option '{}'", arg)
            } else {
                format!("unknown argument '{}'", arg)
            }
        })
        .collect()
}

/// Run the accepted command line and return the exit code.
fn execute(matches: &ArgMatches) -> i32 {
    match run(matches) {
        Ok(()) => 0,
        Err(e) => {
            println!("{}", error_line(&e));
            1
        }
    }
}

fn error_line(e: &anyhow::Error) -> String {
    format!("error: {}", e)
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let mut switcher = audioswitch::Switcher::connect(matches.value_of("SERVER"))?;
    switcher.load_server_info()?;
    switcher.load_sinks()?;

    if matches.is_present("INFO") {
        if let Some(info) = switcher.server_info() {
            println!("server: {} {}", info.server_name, info.server_version);
            println!("default sink: {}", info.default_sink_name);
        }
    }

    if matches.is_present("LIST") {
        print!("{}", audioswitch::format_table(switcher.sinks()));
    }

    if let Some(target) = matches.value_of("SET") {
        let exact = matches.is_present("EXACT");
        let sink = switcher.switch_to(target, exact)?;
        eprintln!("new default sink:\n{}", audioswitch::format_row(&sink));
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::{error_line, execute, parse, split_short_flags, Parsed};
    use std::ffi::OsString;

    fn diagnostics(args: &[&str]) -> Option<Vec<String>> {
        match parse(args) {
            Parsed::Usage(lines) => Some(lines),
            Parsed::Run(_) => None,
        }
    }

    fn split(args: &[&str]) -> Vec<String> {
        let args = args.iter().map(OsString::from).collect();
        split_short_flags(args)
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn no_arguments_is_usage() {
        assert_eq!(diagnostics(&["audioswitch"]), Some(vec![]));
        assert_eq!(diagnostics(&[]), Some(vec![]));
    }

    #[test]
    fn help_is_usage() {
        assert_eq!(diagnostics(&["audioswitch", "--help"]), Some(vec![]));
        assert_eq!(diagnostics(&["audioswitch", "-h"]), Some(vec![]));
    }

    #[test]
    fn one_line_per_stray() {
        assert_eq!(
            diagnostics(&["audioswitch", "--bogus", "foo"]),
            Some(vec![
                "unknown option '--bogus'".to_owned(),
                "unknown argument 'foo'".to_owned(),
            ])
        );
        assert_eq!(
            diagnostics(&["audioswitch", "-l", "-x"]),
            Some(vec!["unknown option '-x'".to_owned()])
        );
    }

    #[test]
    fn bundled_flags_are_split() {
        assert_eq!(split(&["audioswitch", "-lx"]), vec!["audioswitch", "-l", "-x"]);
        assert_eq!(split(&["audioswitch", "-le"]), vec!["audioswitch", "-l", "-e"]);
        assert_eq!(
            diagnostics(&["audioswitch", "-lx"]),
            Some(vec!["unknown option '-x'".to_owned()])
        );
    }

    #[test]
    fn bundle_ends_at_value_option() {
        assert_eq!(
            split(&["audioswitch", "-lsheadset"]),
            vec!["audioswitch", "-l", "-sheadset"]
        );
        // a separate value is never split
        assert_eq!(
            split(&["audioswitch", "-ls", "-lx"]),
            vec!["audioswitch", "-l", "-s", "-lx"]
        );
        assert_eq!(
            split(&["audioswitch", "-s", "-lx"]),
            vec!["audioswitch", "-s", "-lx"]
        );
        assert_eq!(
            split(&["audioswitch", "--server", "-ab"]),
            vec!["audioswitch", "--server", "-ab"]
        );
    }

    #[test]
    fn set_needs_a_value() {
        let lines = diagnostics(&["audioswitch", "-s"]).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("--set"), "{:?}", lines);

        let lines = diagnostics(&["audioswitch", "--set="]).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn accepted_commands_run() {
        for args in [
            &["audioswitch", "-l"][..],
            &["audioswitch", "-s", "headset", "-e"][..],
            &["audioswitch", "-ie", "--set", "1"][..],
            &["audioswitch", "-ls", "headset"][..],
        ] {
            match parse(args) {
                Parsed::Run(m) => assert!(m.is_present("LIST") || m.is_present("SET")),
                Parsed::Usage(lines) => panic!("{:?} rejected: {:?}", args, lines),
            }
        }

        match parse(&["audioswitch", "-lsheadset"]) {
            Parsed::Run(m) => {
                assert!(m.is_present("LIST"));
                assert_eq!(m.value_of("SET"), Some("headset"));
            }
            Parsed::Usage(lines) => panic!("rejected: {:?}", lines),
        }
    }

    #[test]
    fn runtime_failure_exits_one() {
        let matches = match parse(&[
            "audioswitch",
            "-l",
            "--server",
            "unix:/nonexistent/audioswitch/native",
        ]) {
            Parsed::Run(m) => m,
            Parsed::Usage(lines) => panic!("rejected: {:?}", lines),
        };
        assert_eq!(execute(&matches), 1);
    }

    #[test]
    fn error_line_format() {
        let err = anyhow::Error::from(audioswitch::Error::Resolution {
            target: "speakers".to_owned(),
            exact: true,
        });
        assert_eq!(
            error_line(&err),
            "error: no sink found with exact match to speakers"
        );
    }
}
