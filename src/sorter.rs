use nalgebra::{distance, Point2};

/// Order candidate centers by distance to `frame_center`, closest first.
///
/// Returns indices into `centers`. Absent entries go last and the sort is
/// stable, so equal distances keep feed order.
pub fn sort_by_distance_to_center(
    centers: &[Option<Point2<f32>>],
    frame_center: Point2<f32>,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..centers.len()).collect();
    let key = |i: usize| centers[i].map(|c| distance(&c, &frame_center));
    order.sort_by(|&a, &b| match (key(a), key(b)) {
        (Some(da), Some(db)) => da.total_cmp(&db),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    order
}
