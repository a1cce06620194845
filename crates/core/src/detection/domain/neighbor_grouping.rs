use crate::shared::rectangle::Rectangle;

/// Two rectangles belong to the same cluster when every edge lies within
/// `eps` of the mean of their smaller extents.
fn similar(a: &Rectangle, b: &Rectangle, eps: f64) -> bool {
    let delta =
        eps * (a.width.min(b.width) + a.height.min(b.height)) as f64 * 0.5;
    (a.x - b.x).abs() as f64 <= delta
        && (a.y - b.y).abs() as f64 <= delta
        && (a.right() - b.right()).abs() as f64 <= delta
        && (a.bottom() - b.bottom()).abs() as f64 <= delta
}

fn find(parents: &mut [usize], mut i: usize) -> usize {
    while parents[i] != i {
        parents[i] = parents[parents[i]];
        i = parents[i];
    }
    i
}

struct Cluster {
    rect: Rectangle,
    members: u32,
}

/// Collapses overlapping raw scan hits into confirmed detections.
///
/// Hits are partitioned by [`similar`] (transitively). A cluster survives only
/// with more than `min_neighbors` members and is reported as the average of
/// its members. A surviving rectangle that lies inside a clearly stronger one
/// is dropped. `min_neighbors == 0` returns the hits untouched.
///
/// Clusters are emitted in order of their first member.
pub fn group_rectangles(candidates: &[Rectangle], min_neighbors: u32, eps: f64) -> Vec<Rectangle> {
    if min_neighbors == 0 || candidates.is_empty() {
        return candidates.to_vec();
    }

    let n = candidates.len();
    let mut parents: Vec<usize> = (0..n).collect();
    for i in 0..n {
        for j in 0..i {
            if similar(&candidates[i], &candidates[j], eps) {
                let (ri, rj) = (find(&mut parents, i), find(&mut parents, j));
                if ri != rj {
                    parents[ri] = rj;
                }
            }
        }
    }

    // root index -> cluster slot, in first-appearance order
    let mut slot_of_root: Vec<Option<usize>> = vec![None; n];
    let mut sums: Vec<[i64; 4]> = Vec::new();
    let mut counts: Vec<u32> = Vec::new();
    for (i, r) in candidates.iter().enumerate() {
        let root = find(&mut parents, i);
        let slot = *slot_of_root[root].get_or_insert_with(|| {
            sums.push([0; 4]);
            counts.push(0);
            sums.len() - 1
        });
        let s = &mut sums[slot];
        s[0] += r.x as i64;
        s[1] += r.y as i64;
        s[2] += r.width as i64;
        s[3] += r.height as i64;
        counts[slot] += 1;
    }

    let clusters: Vec<Cluster> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &members)| {
            let avg = |v: i64| (v as f64 / members as f64).round() as i32;
            Cluster {
                rect: Rectangle::new(avg(s[0]), avg(s[1]), avg(s[2]), avg(s[3])),
                members,
            }
        })
        .collect();

    clusters
        .iter()
        .enumerate()
        .filter(|(_, c)| c.members > min_neighbors)
        .filter(|&(i, c)| {
            !clusters.iter().enumerate().any(|(j, outer)| {
                j != i
                    && outer.members > min_neighbors
                    && nested_in(&c.rect, &outer.rect, eps)
                    && (outer.members > c.members.max(3) || c.members < 3)
            })
        })
        .map(|(_, c)| c.rect)
        .collect()
}

fn nested_in(inner: &Rectangle, outer: &Rectangle, eps: f64) -> bool {
    let dx = (outer.width as f64 * eps).round() as i32;
    let dy = (outer.height as f64 * eps).round() as i32;
    inner.x >= outer.x - dx
        && inner.y >= outer.y - dy
        && inner.right() <= outer.right() + dx
        && inner.bottom() <= outer.bottom() + dy
}
