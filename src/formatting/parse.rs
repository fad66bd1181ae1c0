use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{escaped_transform, take_while1},
    character::complete::{anychar, char},
    combinator::{cut, eof, map, not},
    multi::many0,
};

#[derive(Debug, PartialEq, Eq)]
pub enum Token<'a> {
    Text(String),
    Placeholder(&'a str),
}

fn alphanum1(i: &str) -> IResult<&str, &str> {
    take_while1(|x: char| x.is_alphanumeric() || x == '_').parse(i)
}

// `$var`
fn parse_placeholder(i: &str) -> IResult<&str, &str> {
    (char('$'), cut(alphanum1)).map(|(_, name)| name).parse(i)
}

// `just escaped \$ text`
fn parse_string(i: &str) -> IResult<&str, String> {
    (
        not(eof),
        escaped_transform(take_while1(|x| x != '$' && x != '\\'), '\\', anychar),
    )
        .map(|(_, text)| text)
        .parse(i)
}

pub fn parse_tokens(i: &str) -> IResult<&str, Vec<Token<'_>>> {
    many0(alt((
        map(parse_string, Token::Text),
        map(parse_placeholder, Token::Placeholder),
    )))
    .parse(i)
}
