//! Manifest file naming: `<type_tag><id>_<rank>` in the configured
//! database directory.

/// Which variant of index a manifest belongs to, selecting the filename's
/// type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKindTag {
    /// Primary or secondary index, visible to the whole job.
    Remote,
    /// Index visible only to its creating rank.
    Local,
}

impl IndexKindTag {
    fn tag(self) -> &'static str {
        match self {
            IndexKindTag::Remote => "r",
            IndexKindTag::Local => "l",
        }
    }
}

/// Build a manifest's file name: `<type_tag><id>_<rank>`.
pub fn manifest_file_name(kind: IndexKindTag, id: u32, rank: u32) -> String {
    format!("{}{}_{}", kind.tag(), id, rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_and_local_get_distinct_tags() {
        assert_eq!(manifest_file_name(IndexKindTag::Remote, 0, 3), "r0_3");
        assert_eq!(manifest_file_name(IndexKindTag::Local, 2, 3), "l2_3");
    }
}
