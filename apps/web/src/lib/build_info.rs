pub fn git_commit_hash() -> &'static str {
    match option_env!("REGISTRO_WEB_GIT_SHA") {
        Some(value) if !value.is_empty() => value,
        _ => "unknown",
    }
}

pub fn short_commit() -> &'static str {
    let hash = git_commit_hash();
    if hash.len() > 7 { &hash[..7] } else { hash }
}
