use clap::Parser;

/// Generates anonymous voter codes from a list of emails, then counts the votes cast with
/// these codes.
///
/// To generate a CSV file with voter codes to upload to a mass mailer, based on the lists
/// of emails in voters1.txt and voters2.txt for a vote on favorite color:
///
///   typevote -n fav-color -e voters1.txt -e voters2.txt --codefile codes.csv
///
/// When the voting has completed, run again with the same parameters, adding the CSV file
/// with the cast votes:
///
///   typevote -n fav-color -e voters1.txt -e voters2.txt --codefile codes.csv
///     --votefile cast-votes.csv --resultfile results.txt
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None, verbatim_doc_comment)]
pub struct Args {
    /// (string) Name of the vote. It salts the voter codes and must be the same for
    /// successive invocations that pertain to the same vote. Defaults to the current time.
    #[clap(short, long, value_parser)]
    pub name: Option<String>,

    /// (file path, repeatable) List of voter emails: either one address per line, or a CSV
    /// file with an email column and an optional organization column.
    #[clap(short, long, value_parser)]
    pub emailfile: Vec<String>,

    /// (file path) A codefile written by an earlier run. The voters are read from it instead
    /// of being registered from email files.
    #[clap(long, value_parser)]
    pub load_codes: Option<String>,

    /// (file path) Generated CSV file with the email, organization and code of each voter.
    #[clap(short, long, value_parser)]
    pub codefile: Option<String>,

    /// (file path) The votes cast by the voters (CSV, or xlsx).
    #[clap(short, long, value_parser)]
    pub votefile: Option<String>,

    /// (csv or xlsx, default inferred from the file extension) The type of the votefile.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (file path) Generated text file with the vote count.
    #[clap(short, long, value_parser)]
    pub resultfile: Option<String>,

    /// (file path) Generated text file with the scored questions, ranked.
    #[clap(short, long, value_parser)]
    pub winfile: Option<String>,

    /// (file path) Quiz answer key. Each line reads index:points:questionPattern:answerPattern
    #[clap(short, long, value_parser)]
    pub answerkey: Option<String>,

    /// (file path) A JSON configuration file. Command line options take precedence over it.
    #[clap(long, value_parser)]
    pub config: Option<String>,

    /// (default voterid) Name of the votefile column holding the voter codes.
    #[clap(long, value_parser)]
    pub code_column: Option<String>,

    /// (default email) Name of the email column in tabular email files.
    #[clap(long, value_parser)]
    pub email_column: Option<String>,

    /// (default organization) Name of the organization column in tabular email files.
    #[clap(long, value_parser)]
    pub org_column: Option<String>,

    /// (default 6) Number of commas from which answers are read as a ranking, and the points
    /// given to the first ranked option.
    #[clap(long, value_parser)]
    pub rank: Option<u32>,

    /// (default 12) Number of hex digits in a voter code.
    #[clap(long, value_parser)]
    pub code_length: Option<usize>,

    // Other arguments
    /// If passed as an argument, traces every record processed.
    #[clap(short, long, takes_value = false)]
    pub debug: bool,
}
