use std::borrow::Cow;

/// Produces a textual diff between two contents.
/// An empty result means the contents are identical.
pub trait Differ {
    fn diff(&self, old: &[u8], new: &[u8]) -> String;
}

/// Line-based LCS diff listing only changed lines as `- old` / `+ new`.
///
/// Lines are compared with their terminators, so whitespace and line-ending
/// changes count as differences.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineDiffer;

#[derive(Debug, PartialEq, Eq)]
enum Edit<'a> {
    Removed(&'a str),
    Added(&'a str),
}

impl Differ for LineDiffer {
    fn diff(&self, old: &[u8], new: &[u8]) -> String {
        if old == new {
            return String::new();
        }

        let old_text = String::from_utf8_lossy(old);
        let new_text = String::from_utf8_lossy(new);
        let old_lines = split_lines(&old_text);
        let new_lines = split_lines(&new_text);

        edits(&old_lines, &new_lines)
            .into_iter()
            .map(|edit| match edit {
                Edit::Removed(line) => format!("- {}", display(line)),
                Edit::Added(line) => format!("+ {}", display(line)),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn split_lines<'a>(text: &'a Cow<'_, str>) -> Vec<&'a str> {
    text.split_inclusive('\n').collect()
}

fn display(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

fn edits<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<Edit<'a>> {
    // Common prefix and suffix never appear in the output.
    let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
    let old = &old[prefix..];
    let new = &new[prefix..];
    let suffix = old
        .iter()
        .rev()
        .zip(new.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let old = &old[..old.len() - suffix];
    let new = &new[..new.len() - suffix];

    let (n, m) = (old.len(), new.len());

    // lcs[i][j] = length of the LCS of old[i..] and new[j..]
    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            out.push(Edit::Removed(old[i]));
            i += 1;
        } else {
            out.push(Edit::Added(new[j]));
            j += 1;
        }
    }
    out.extend(old[i..].iter().map(|&l| Edit::Removed(l)));
    out.extend(new[j..].iter().map(|&l| Edit::Added(l)));
    out
}
