use calc::{Error, Falsy, Lexer, Options, UnknownFunction};
use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(version, about = "Evaluate arithmetic and boolean expressions")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate an expression; `_1`..`_9` refer to the arguments, `_0` to their count
    Eval {
        #[arg(allow_hyphen_values = true)]
        expression: String,
        #[arg(num_args = 0..=9, allow_negative_numbers = true)]
        arguments: Vec<f64>,
        /// Treat only exact zero as false
        #[arg(long)]
        exact_falsy: bool,
        /// Fail on calls to unknown functions instead of yielding 0
        #[arg(long)]
        reject_unknown_functions: bool,
    },
    /// Print the expression tree in prefix form
    Parse {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
    /// Print the token stream
    Tokenize {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
}

fn main() -> miette::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Eval {
            expression,
            arguments,
            exact_falsy,
            reject_unknown_functions,
        } => {
            let options = Options {
                falsy: if exact_falsy {
                    Falsy::Exact
                } else {
                    Falsy::Tolerant
                },
                unknown_functions: if reject_unknown_functions {
                    UnknownFunction::Reject
                } else {
                    UnknownFunction::Zero
                },
            };

            let value = match calc::evaluate_with(&expression, &arguments, options) {
                Ok(value) => value,
                Err(e @ Error::Parse(_)) => {
                    eprintln!("{:?}", miette::Report::new(e));
                    std::process::exit(65);
                }
                Err(e) => return Err(e.into()),
            };
            println!("{value}");
        }
        Commands::Parse { expression } => match calc::parse(&expression) {
            Ok(tree) => println!("{tree}"),
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(e));
                std::process::exit(65);
            }
        },
        Commands::Tokenize { expression } => {
            for token in Lexer::new(&expression) {
                let token = match token {
                    Ok(token) => token,
                    Err(e) => {
                        eprintln!("{:?}", miette::Report::new(e));
                        std::process::exit(65);
                    }
                };
                println!("{token}");
            }
            println!("EOF  null");
        }
    }
    Ok(())
}
