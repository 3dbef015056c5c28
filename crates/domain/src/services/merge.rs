//! Identity merge for host lists.

use crate::models::HostView;

/// Collapses entries that share an `id` or an `ip`.
///
/// Walks the input in order; an entry matching already kept ones (by id or
/// by ip) replaces the first of them in place and removes the rest, so the
/// last write wins, the position of the first occurrence is preserved, and no
/// two kept entries share an id or an ip.
pub fn merge_by_identity(hosts: Vec<HostView>) -> Vec<HostView> {
    let mut merged: Vec<HostView> = Vec::with_capacity(hosts.len());
    for host in hosts {
        let matches: Vec<usize> = merged
            .iter()
            .enumerate()
            .filter(|(_, kept)| kept.id == host.id || kept.ip == host.ip)
            .map(|(index, _)| index)
            .collect();

        match matches.split_first() {
            Some((&first, rest)) => {
                for &index in rest.iter().rev() {
                    merged.remove(index);
                }
                merged[first] = host;
            }
            None => merged.push(host),
        }
    }
    merged
}
