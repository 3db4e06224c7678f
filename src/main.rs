use argh::FromArgs;
use shell_line::{
    Action, Environment, Interpreter, PARSE_ERROR_EXIT_CODE, Parser, ParserOptions, exit_code_for,
    split_assignment,
};
use tracing::{Level, debug};

#[derive(FromArgs)]
/// Parse a shell-like command line and print or run it.
struct Args {
    #[argh(positional)]
    /// the line to parse; starts an interactive prompt when omitted
    line: Option<String>,

    #[argh(switch, short = 'x')]
    /// run the parsed command instead of printing it
    exec: bool,

    #[argh(switch)]
    /// accept unquoted `*`, `?`, `[`, `#` and `~` as ordinary characters
    lenient: bool,

    #[argh(switch)]
    /// reject `$` instead of expanding variables
    no_expand: bool,

    #[argh(option, short = 'e')]
    /// extra NAME=value variable for expansion and the child environment; repeatable
    env: Vec<String>,

    #[argh(switch, short = 'v')]
    /// log parsing and process events to stderr
    verbose: bool,

    #[argh(switch)]
    /// log every variable lookup as well
    trace: bool,
}

fn main() {
    let args: Args = argh::from_env();

    let level = if args.trace {
        Level::TRACE
    } else if args.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let options = ParserOptions::default()
        .with_strict(!args.lenient)
        .with_expand_variables(!args.no_expand);

    let mut env = Environment::new();
    for assignment in &args.env {
        if split_assignment(assignment).is_none() {
            eprintln!("shell_line: --env expects NAME=value, got {assignment:?}");
            std::process::exit(PARSE_ERROR_EXIT_CODE);
        }
    }
    env.apply_assignments(&args.env);

    let action = if args.exec {
        Action::Execute
    } else {
        Action::Describe
    };
    let mut interpreter = Interpreter::new(Parser::new(options), env).with_action(action);

    let code = match args.line {
        Some(line) => match interpreter.run_line(&line, &mut std::io::stdout()) {
            Ok(code) => code,
            Err(err) => {
                debug!(error = %format!("{err:#}"), "line failed");
                eprintln!("shell_line: {err:#}");
                exit_code_for(&err)
            }
        },
        None => match interpreter.repl() {
            Ok(code) => code,
            Err(err) => {
                eprintln!("shell_line: {err}");
                1
            }
        },
    };
    std::process::exit(code);
}
