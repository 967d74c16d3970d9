//! Built-in corpus used to bootstrap an empty store.

use crate::dao::models::BuggyFileEntity;

struct Snippet {
    id: &'static str,
    description: &'static str,
    code: &'static [&'static str],
    buggy_lines: &'static [u32],
}

const SNIPPETS: &[Snippet] = &[
    Snippet {
        id: "average-off-by-one",
        description: "Computes the mean of a list of readings.",
        code: &[
            "function average(readings) {",
            "  let sum = 0;",
            "  for (let i = 1; i <= readings.length; i++) {",
            "    sum += readings[i];",
            "  }",
            "  return sum / readings.length;",
            "}",
        ],
        buggy_lines: &[3],
    },
    Snippet {
        id: "binary-search",
        description: "Returns the index of target in a sorted array, or -1.",
        code: &[
            "function search(sorted, target) {",
            "  let lo = 0;",
            "  let hi = sorted.length;",
            "  while (lo <= hi) {",
            "    const mid = Math.floor((lo + hi) / 2);",
            "    if (sorted[mid] === target) {",
            "      return mid;",
            "    }",
            "    if (sorted[mid] < target) {",
            "      lo = mid;",
            "    } else {",
            "      hi = mid - 1;",
            "    }",
            "  }",
            "  return -1;",
            "}",
        ],
        buggy_lines: &[3, 10],
    },
    Snippet {
        id: "word-count",
        description: "Counts how often each word appears in a sentence.",
        code: &[
            "def word_count(sentence):",
            "    counts = {}",
            "    for word in sentence.split(' '):",
            "        word = word.lower",
            "        if word in counts:",
            "            counts[word] = 1",
            "        else:",
            "            counts[word] = 1",
            "    return counts",
        ],
        buggy_lines: &[4, 6],
    },
    Snippet {
        id: "clamp-range",
        description: "Restricts a value to the inclusive range [low, high].",
        code: &[
            "fn clamp(value: i32, low: i32, high: i32) -> i32 {",
            "    if value < low {",
            "        return high;",
            "    }",
            "    if value > high {",
            "        return high;",
            "    }",
            "    low",
            "}",
        ],
        buggy_lines: &[3, 8],
    },
    Snippet {
        id: "discount-total",
        description: "Applies a percentage discount to a basket total.",
        code: &[
            "def discounted_total(prices, percent):",
            "    total = 0",
            "    for price in prices:",
            "        total += price",
            "    discount = total * percent",
            "    if discount > total:",
            "        discount = total",
            "    return total + discount",
        ],
        buggy_lines: &[5, 8],
    },
];

/// Snippets shipped with the binary, in id order.
pub fn builtin_files() -> Vec<BuggyFileEntity> {
    let mut files: Vec<_> = SNIPPETS
        .iter()
        .map(|snippet| BuggyFileEntity {
            id: snippet.id.to_owned(),
            code: snippet.code.join("\n"),
            description: snippet.description.to_owned(),
            buggy_lines: snippet.buggy_lines.to_vec(),
        })
        .collect();
    files.sort_by(|a, b| a.id.cmp(&b.id));
    files
}
