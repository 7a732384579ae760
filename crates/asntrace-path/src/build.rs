use asntrace_model::{AsInfo, PathEntry, ReportRow};

/// Collapses resolved hops into the AS path, in hop order.
///
/// Private, no-data and no-reply hops are skipped. An entry is appended only
/// when it differs from the last appended one, so an AS that is left and
/// re-entered shows up again.
pub fn build_as_path(rows: &[ReportRow]) -> Vec<PathEntry> {
    let mut path: Vec<PathEntry> = Vec::new();
    for row in rows {
        let ReportRow::Reply {
            owner: AsInfo::Resolved(owner),
            ..
        } = row
        else {
            continue;
        };
        let entry = PathEntry::from_owner(owner);
        if path.last() != Some(&entry) {
            path.push(entry);
        }
    }
    path
}
