//! Compact textual notation for fragment trees.
//!
//! The notation is the same as the structural id of a fragment:
//!
//! ```text
//! v(TextView, h(Button, EditText))
//! ```
//!
//! `h(...)` and `v(...)` are horizontal and vertical fragments, anything else
//! is a leaf key.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0, one_of},
    combinator::{all_consuming, map},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};

use crate::area::Area;
use crate::errors::NotationError;
use crate::fragment::{Fragment, Item};
use crate::types::Direction;

/// Syntax tree of the notation, before leaves are turned into areas.
#[derive(Debug, Clone, PartialEq)]
enum Node<'a> {
    Leaf(&'a str),
    Group(Direction, Vec<Node<'a>>),
}

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}

fn key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || "_.-:$#".contains(c))(input)
}

fn direction(input: &str) -> IResult<&str, Direction> {
    map(one_of("hv"), |c| {
        if c == 'h' {
            Direction::Horizontal
        } else {
            Direction::Vertical
        }
    })(input)
}

fn group(input: &str) -> IResult<&str, Node<'_>> {
    map(
        pair(
            terminated(direction, preceded(multispace0, char('('))),
            terminated(
                separated_list0(char(','), ws(node)),
                preceded(multispace0, char(')')),
            ),
        ),
        |(direction, children)| Node::Group(direction, children),
    )(input)
}

fn node(input: &str) -> IResult<&str, Node<'_>> {
    alt((group, map(key, Node::Leaf)))(input)
}

fn build<F>(node: Node<'_>, leaf: &mut F) -> Item
where
    F: FnMut(&str) -> Area,
{
    match node {
        Node::Leaf(key) => Item::Area(leaf(key)),
        Node::Group(direction, children) => Item::Fragment(Fragment::with_items(
            direction,
            children.into_iter().map(|child| build(child, &mut *leaf)),
        )),
    }
}

/// Parse a fragment tree, creating leaves with [`parse_notation_with`]'s
/// default: an area with undefined sizes and the key as its id.
pub fn parse_notation(input: &str) -> Result<Fragment, NotationError> {
    parse_notation_with(input, |key| Area::new().with_id(key))
}

/// Parse a fragment tree, creating each leaf area with `leaf`.
pub fn parse_notation_with<F>(input: &str, mut leaf: F) -> Result<Fragment, NotationError>
where
    F: FnMut(&str) -> Area,
{
    let (_, root) = all_consuming(ws(group))(input).map_err(|err| {
        let rest = match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e.input,
            nom::Err::Incomplete(_) => "",
        };
        NotationError::Syntax {
            offset: input.len() - rest.len(),
        }
    })?;

    match build(root, &mut leaf) {
        Item::Fragment(fragment) => Ok(fragment),
        Item::Area(_) => Err(NotationError::NotAFragment),
    }
}
