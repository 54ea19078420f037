//! Distribution-native version ordering (dpkg's `--compare-versions` rules).
//!
//! The original policy delegates to `apt_pkg.version_compare`. We reimplement
//! dpkg's version comparison directly rather than pulling in a bindings crate:
//! split into epoch / upstream-version / debian-revision, then compare each
//! component with the alternating-digit/non-digit run rule, where `~` sorts
//! before everything (including the empty string).

use std::cmp::Ordering;

/// Compare two version strings using dpkg ordering rules.
pub fn compare(a: &str, b: &str) -> Ordering {
    let (epoch_a, rest_a) = split_epoch(a);
    let (epoch_b, rest_b) = split_epoch(b);
    match epoch_a.cmp(&epoch_b) {
        Ordering::Equal => {}
        other => return other,
    }

    let (upstream_a, revision_a) = split_revision(rest_a);
    let (upstream_b, revision_b) = split_revision(rest_b);

    match compare_component(upstream_a, upstream_b) {
        Ordering::Equal => compare_component(revision_a, revision_b),
        other => other,
    }
}

pub fn lt(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Less
}

fn split_epoch(v: &str) -> (u64, &str) {
    match v.find(':') {
        Some(idx) => {
            let epoch = v[..idx].parse().unwrap_or(0);
            (epoch, &v[idx + 1..])
        }
        None => (0, v),
    }
}

fn split_revision(v: &str) -> (&str, &str) {
    match v.rfind('-') {
        Some(idx) => (&v[..idx], &v[idx + 1..]),
        None => (v, ""),
    }
}

/// dpkg's "order" for a single character in the non-digit run: `~` is lowest,
/// then the end of the string, then letters (ASCII order), then everything
/// else, in ASCII order, with letters still sorting before non-letters.
fn char_order(c: Option<char>) -> (u8, u32) {
    match c {
        None => (1, 0),
        Some('~') => (0, 0),
        Some(c) if c.is_ascii_alphabetic() => (2, c as u32),
        Some(c) => (3, c as u32),
    }
}

fn compare_component(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();

    loop {
        // Compare non-digit runs character by character using dpkg ordering.
        loop {
            let ac = ai.peek().copied().filter(|c| !c.is_ascii_digit());
            let bc = bi.peek().copied().filter(|c| !c.is_ascii_digit());
            if ac.is_none() && bc.is_none() {
                break;
            }
            match char_order(ac).cmp(&char_order(bc)) {
                Ordering::Equal => {
                    if ac.is_some() {
                        ai.next();
                    }
                    if bc.is_some() {
                        bi.next();
                    }
                    if ac.is_none() && bc.is_none() {
                        break;
                    }
                }
                other => return other,
            }
        }

        // Compare digit runs numerically.
        let na = take_digits(&mut ai);
        let nb = take_digits(&mut bi);
        match na.cmp(&nb) {
            Ordering::Equal => {}
            other => return other,
        }

        if ai.peek().is_none() && bi.peek().is_none() {
            return Ordering::Equal;
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars>) -> u64 {
    let mut n: u64 = 0;
    let mut any = false;
    while let Some(c) = it.peek().copied() {
        if c.is_ascii_digit() {
            any = true;
            n = n.saturating_mul(10).saturating_add(c.to_digit(10).unwrap() as u64);
            it.next();
        } else {
            break;
        }
    }
    let _ = any;
    n
}
