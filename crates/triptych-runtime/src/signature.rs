#![forbid(unsafe_code)]

//! Content signatures.
//!
//! A [`ContentSignature`] summarizes a list as its item count plus one tag per
//! item, in order. Each tag is written with its byte length in front, so no
//! two different tag sequences encode to the same signature.

use std::fmt;

/// Equality-comparable summary of list content.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct ContentSignature {
    encoded: String,
    count: usize,
}

impl ContentSignature {
    /// Signature of an empty list.
    #[must_use]
    pub fn empty() -> Self {
        Self::builder(0).finish()
    }

    /// Start a signature for a list of `count` items.
    #[must_use]
    pub fn builder(count: usize) -> SignatureBuilder {
        SignatureBuilder::new(count)
    }

    /// Build from an iterator of tags.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: Vec<S> = tags.into_iter().collect();
        let mut builder = SignatureBuilder::new(tags.len());
        for tag in &tags {
            builder.push(tag.as_ref());
        }
        builder.finish()
    }

    /// Number of items the signature was built from.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.encoded
    }
}

impl fmt::Debug for ContentSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentSignature({:?})", self.encoded)
    }
}

/// Incremental [`ContentSignature`] encoder.
#[derive(Debug)]
pub struct SignatureBuilder {
    encoded: String,
    count: usize,
}

impl SignatureBuilder {
    fn new(count: usize) -> Self {
        let mut encoded = String::with_capacity(8 + count * 8);
        encoded.push_str(&count.to_string());
        encoded.push('#');
        Self { encoded, count }
    }

    /// Append one item tag.
    pub fn push(&mut self, tag: &str) -> &mut Self {
        self.encoded.push_str(&tag.len().to_string());
        self.encoded.push(':');
        self.encoded.push_str(tag);
        self
    }

    #[must_use]
    pub fn finish(self) -> ContentSignature {
        ContentSignature {
            encoded: self.encoded,
            count: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_content_gives_equal_signatures() {
        let a = ContentSignature::from_tags(["pending", "done"]);
        let b = ContentSignature::from_tags(vec![String::from("pending"), String::from("done")]);
        assert_eq!(a, b);
        assert_eq!(a.count(), 2);
    }

    #[test]
    fn any_tag_change_differs() {
        let a = ContentSignature::from_tags(["pending"]);
        let b = ContentSignature::from_tags(["done"]);
        assert_ne!(a, b);
    }

    #[test]
    fn separators_inside_tags_do_not_collide() {
        let a = ContentSignature::from_tags(["a|b", "c"]);
        let b = ContentSignature::from_tags(["a", "b|c"]);
        assert_ne!(a, b);
        let c = ContentSignature::from_tags(["1:x"]);
        let d = ContentSignature::from_tags(["1", "x"]);
        assert_ne!(c, d);
    }

    #[test]
    fn empty_is_distinct_from_single_empty_tag() {
        assert_ne!(ContentSignature::empty(), ContentSignature::from_tags([""]));
        assert_eq!(ContentSignature::empty().count(), 0);
    }
}
