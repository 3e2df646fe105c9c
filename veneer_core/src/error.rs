// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! Nothing in the frame loop propagates these as hard failures. A
//! [`RenderError`] empties the subtree of the node that produced it and is
//! reported in [`FrameChanges::errors`](crate::context::FrameChanges::errors);
//! a [`PoolError`] leaves one surface unpresented until a later frame's
//! retry allocates its element.

use alloc::string::String;

use crate::pool::ElementKind;

/// A render-tree node could not be evaluated this frame.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// A computed modifier attribute returned an error.
    #[error("{attribute} attribute could not be resolved: {reason}")]
    Attribute {
        /// Name of the attribute (`transform`, `opacity`, ...).
        attribute: &'static str,
        /// Message produced by the attribute's accessor.
        reason: String,
    },
}

/// The element pool's container refused to create an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The container could not create an element of this kind.
    #[error("container failed to create a <{}> element", .0.as_str())]
    CreateFailed(ElementKind),
}

/// A tag name did not match any [`ElementKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unsupported element tag")]
pub struct UnknownTag;

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::ToString as _;

    use super::*;

    #[test]
    fn display_names_the_attribute() {
        let err = RenderError::Attribute {
            attribute: "transform",
            reason: "boom".into(),
        };
        let text = err.to_string();
        assert!(text.contains("transform"), "got {text}");
        assert!(text.contains("boom"), "got {text}");
    }

    #[test]
    fn pool_error_names_the_tag() {
        let text = PoolError::CreateFailed(ElementKind::Canvas).to_string();
        assert!(text.contains("<canvas>"), "got {text}");
    }

    #[test]
    fn unknown_tag_converts_to_a_boxed_error() {
        fn parse(tag: &str) -> Result<ElementKind, Box<dyn core::error::Error>> {
            Ok(tag.parse::<ElementKind>()?)
        }
        assert_eq!(parse("span").ok(), Some(ElementKind::Span));
        let err = parse("blink").unwrap_err();
        assert_eq!(err.to_string(), "unsupported element tag");
    }
}
