use crate::api::Credentials;
use crate::listing::PageSize;
use crate::runner::Command;
use crate::utils;

pub const HELP: &str = "commands:
  phone <digits>            search by phone (sent after a short pause)
  name <text>               search by name (sent after a short pause)
  search                    send the search now
  clear                     clear both search terms
  size <3|5|10|20|50>       rows per page
  page <n> | next | prev    move between pages
  toggle <id>               show/hide the details panel of a record
  refresh                   reload the current page
  login <email> <password>  sign in
  logout                    sign out
  help | quit";

#[derive(Debug, PartialEq, Eq)]
pub enum ShellLine {
    Run(Command),
    Help,
    Blank,
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    }
}

pub fn parse_line(line: &str) -> Result<ShellLine, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ShellLine::Blank);
    }
    let (keyword, rest) = split_keyword(line);
    let command = match keyword.to_ascii_lowercase().as_str() {
        "help" | "?" => return Ok(ShellLine::Help),
        "quit" | "exit" | "q" => Command::Quit,
        "phone" => Command::SetPhone(rest.to_string()),
        "name" => Command::SetName(rest.to_string()),
        "search" => Command::Submit,
        "clear" => Command::Clear,
        "size" | "paginate" => Command::PageSize(rest.parse::<PageSize>()?),
        "page" => Command::GoToPage(utils::parse_positive_u32(rest, "page")?),
        "next" | "n" => Command::NextPage,
        "prev" | "p" => Command::PrevPage,
        "toggle" | "t" => Command::Toggle(utils::parse_record_id(rest)?),
        "refresh" | "r" => Command::Refresh,
        "logout" => Command::Logout,
        "login" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(email), Some(password), None) => {
                    Command::Login(Credentials::new(email, password))
                }
                _ => return Err("usage: login <email> <password>".to_string()),
            }
        }
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(ShellLine::Run(command))
}
