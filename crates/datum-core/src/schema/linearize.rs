//! C3 linearization over declared base lists.
//!
//! Produces the method-resolution order (most-derived first) used by the
//! resolver's ancestor walk. Diamonds are supported; hierarchies whose base
//! orderings contradict each other fail with `None`.

/// C3-merge the candidate with its bases' linearizations.
///
/// `base_lins` are the already-resolved linearizations of the direct bases,
/// in declaration order. Returns `None` when no consistent order exists.
pub(crate) fn linearize(
    candidate: &str,
    bases: &[String],
    base_lins: &[Vec<String>],
) -> Option<Vec<String>> {
    let mut result = vec![candidate.to_string()];

    let mut seqs: Vec<Vec<String>> = base_lins.to_vec();
    seqs.push(bases.to_vec());

    loop {
        seqs.retain(|seq| !seq.is_empty());
        if seqs.is_empty() {
            return Some(result);
        }

        // A good head appears in no sequence's tail.
        let head = seqs
            .iter()
            .map(|seq| &seq[0])
            .find(|head| {
                !seqs
                    .iter()
                    .any(|seq| seq.iter().skip(1).any(|name| &name == head))
            })?
            .clone();

        result.push(head.clone());
        for seq in &mut seqs {
            seq.retain(|name| name != &head);
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn single_chain() {
        // B(A), A()
        let a = names(&["A"]);
        let lin = linearize("B", &names(&["A"]), &[a]).unwrap();

        assert_eq!(lin, names(&["B", "A"]));
    }

    #[test]
    fn diamond_resolves_left_to_right() {
        // D(B, C), B(A), C(A)
        let b = names(&["B", "A"]);
        let c = names(&["C", "A"]);
        let lin = linearize("D", &names(&["B", "C"]), &[b, c]).unwrap();

        assert_eq!(lin, names(&["D", "B", "C", "A"]));
    }

    #[test]
    fn contradictory_order_fails() {
        // X(A, B), Y(B, A), Z(X, Y) has no consistent linearization
        let x = names(&["X", "A", "B"]);
        let y = names(&["Y", "B", "A"]);

        assert!(linearize("Z", &names(&["X", "Y"]), &[x, y]).is_none());
    }
}
