use crate::github::FileContentMap;

/// A group of at most `chunk_size` files reviewed in one prompt
pub type Chunk = FileContentMap;

/// Splits `contents` into consecutive chunks of `chunk_size` entries
///
/// Order is preserved and every entry lands in exactly one chunk; only the
/// last chunk may be smaller. A `chunk_size` of zero is treated as one.
pub fn partition(contents: FileContentMap, chunk_size: usize) -> Vec<Chunk> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(contents.len().div_ceil(chunk_size));
    let mut current = Chunk::with_capacity(chunk_size);

    for (path, content) in contents {
        current.insert(path, content);
        if current.len() == chunk_size {
            chunks.push(std::mem::replace(&mut current, Chunk::with_capacity(chunk_size)));
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::FileContent;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn contents(n: usize) -> FileContentMap {
        (0..n)
            .map(|i| (format!("file{}.rs", i), FileContent::Text(format!("// {}", i))))
            .collect()
    }

    #[test]
    fn test_seven_files_in_threes() {
        let chunks = partition(contents(7), 3);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![3, 3, 1]);

        let first: Vec<&str> = chunks[0].keys().map(String::as_str).collect();
        assert_eq!(first, vec!["file0.rs", "file1.rs", "file2.rs"]);
        assert_eq!(chunks[2].keys().next().map(String::as_str), Some("file6.rs"));
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_chunk() {
        assert_eq!(partition(contents(6), 3).len(), 2);
        assert!(partition(contents(0), 3).is_empty());
    }

    #[test]
    fn test_zero_chunk_size_is_one() {
        assert_eq!(partition(contents(4), 0).len(), 4);
    }

    proptest! {
        #[test]
        fn prop_partition_is_exhaustive_and_ordered(n in 0usize..60, k in 1usize..10) {
            let original = contents(n);
            let chunks = partition(original.clone(), k);

            prop_assert_eq!(chunks.len(), n.div_ceil(k));
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert!(chunk.len() <= k);
                if i + 1 < chunks.len() {
                    prop_assert_eq!(chunk.len(), k);
                }
            }

            let rejoined: Vec<(String, FileContent)> = chunks.into_iter().flatten().collect();
            let expected: Vec<(String, FileContent)> = original.into_iter().collect();
            prop_assert_eq!(rejoined, expected);
        }
    }
}
