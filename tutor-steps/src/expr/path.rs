//! Path addressing for expression trees.
//!
//! A path is written as `root`, or a dot-separated sequence of segments: `term[0]` / `term[1]`
//! for the operands of a binary node, `num` / `den` / `whole` for the parts of a fraction or
//! mixed number, and `arg` for the operand of a unary node. `term[0].num` addresses the
//! numerator of the left operand; the empty sequence addresses the tree itself.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single address segment of an [`AstPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathSeg {
    /// One operand of a binary node: `term[0]` is the left-hand side, `term[1]` the right.
    Term(u8),

    /// The numerator of a fraction or mixed number.
    Num,

    /// The denominator of a fraction or mixed number.
    Den,

    /// The whole part of a mixed number.
    Whole,

    /// The operand of a unary node.
    Arg,
}

impl fmt::Display for PathSeg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Term(index) => write!(f, "term[{}]", index),
            Self::Num => write!(f, "num"),
            Self::Den => write!(f, "den"),
            Self::Whole => write!(f, "whole"),
            Self::Arg => write!(f, "arg"),
        }
    }
}

/// An error produced while parsing a path string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A segment did not match the path grammar.
    #[error("invalid path segment `{0}`")]
    InvalidSegment(String),
}

/// A path from the root of an expression tree to one of its nodes.
///
/// Resolution through [`get_node_at`](super::navigate::get_node_at) is deterministic, and
/// replacement through [`replace_node_at`](super::navigate::replace_node_at) is its inverse:
/// replacing a node with the node just read back yields an identical tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AstPath {
    segments: Vec<PathSeg>,
}

impl AstPath {
    /// The empty path, addressing the root of the tree.
    pub fn root() -> Self {
        Self::default()
    }

    /// The segments of the path, from the root downwards.
    pub fn segments(&self) -> &[PathSeg] {
        &self.segments
    }

    /// Returns true if the path addresses the root of the tree.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the path extended by one segment.
    pub fn child(&self, segment: PathSeg) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Returns the path addressing the parent of this path's node, or [`None`] at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl From<Vec<PathSeg>> for AstPath {
    fn from(segments: Vec<PathSeg>) -> Self {
        Self { segments }
    }
}

impl FromStr for AstPath {
    type Err = PathError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() || raw == "root" {
            return Ok(Self::root());
        }

        let segments = raw
            .split('.')
            .map(|segment| match segment {
                "term[0]" => Ok(PathSeg::Term(0)),
                "term[1]" => Ok(PathSeg::Term(1)),
                "num" => Ok(PathSeg::Num),
                "den" => Ok(PathSeg::Den),
                "whole" => Ok(PathSeg::Whole),
                "arg" => Ok(PathSeg::Arg),
                other => Err(PathError::InvalidSegment(other.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }
}

impl fmt::Display for AstPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "root");
        }

        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, ".")?;
            }
            first = false;
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

impl Serialize for AstPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AstPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
