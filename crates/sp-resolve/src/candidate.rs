//! Candidate path construction.

/// Rebase a logical request path onto the web root.
///
/// With no web root (or a web root that normalizes to nothing, like `"/"` or
/// `"."`) the logical path is returned untouched. A root or empty logical
/// path maps to the web root itself, without a trailing separator. Anything
/// else is joined POSIX-style: empty and `.` segments collapse, `..` pops
/// path segments but never climbs above the web root, and a trailing `/` on
/// the logical path is kept.
pub(crate) fn candidate_path(path: &str, web_root: Option<&str>) -> String {
    let Some(web_root) = web_root else {
        return path.to_owned();
    };

    let root_segments = segments(web_root);
    if root_segments.is_empty() {
        return path.to_owned();
    }

    let mut joined: Vec<&str> = root_segments.clone();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if joined.len() > root_segments.len() {
                    joined.pop();
                }
            }
            _ => joined.push(segment),
        }
    }

    let mut candidate = String::new();
    if web_root.starts_with('/') {
        candidate.push('/');
    }
    candidate.push_str(&joined.join("/"));
    if path.ends_with('/') && joined.len() > root_segments.len() {
        candidate.push('/');
    }
    candidate
}

/// Normalized segments of an absolute or relative path.
fn segments(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            _ => out.push(segment),
        }
    }
    out
}
