use approx::assert_abs_diff_eq;
use embedding_data::{Palette, PointCloudDataset, ValidationError};

fn four_points() -> PointCloudDataset {
    PointCloudDataset::new(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, -2.0],
            [-0.5, 0.5, -3.0],
            [2.0, 2.0, -4.0],
        ],
        vec![1, 2, 3, 4],
        Some(vec![
            "/alpha".into(),
            "/beta".into(),
            "/gamma".into(),
            "/delta".into(),
        ]),
    )
}

#[test]
fn colors_follow_palette_order() {
    let palette =
        Palette::new(vec![[255, 0, 0], [0, 255, 0], [0, 0, 255], [51, 102, 204]]).unwrap();
    let buffer = four_points().into_buffer(&palette).unwrap();

    assert_eq!(buffer.len(), 4);
    assert_eq!(buffer.vertices()[1].color, [0.0, 1.0, 0.0]);

    let last = buffer.vertices()[3].color;
    assert_abs_diff_eq!(last[0], 0.2, epsilon = 1e-6);
    assert_abs_diff_eq!(last[1], 0.4, epsilon = 1e-6);
    assert_abs_diff_eq!(last[2], 0.8, epsilon = 1e-6);

    assert_eq!(buffer.label(2), Some("/gamma"));
}

#[test]
fn every_point_keeps_its_position_and_label() {
    let palette = Palette::reference();
    let source = four_points();
    let buffer = source.clone().into_buffer(&palette).unwrap();

    for (i, v) in buffer.vertices().iter().enumerate() {
        assert_eq!(v.position, source.positions[i]);
        assert_eq!(buffer.label(i), Some(source.labels[i].as_str()));
        assert_eq!(
            v.color,
            palette.normalized(source.categories[i] as i64).unwrap()
        );
    }
}

#[test]
fn category_beyond_palette_is_fatal() {
    let mut ds = four_points();
    ds.categories[3] = 5;
    assert_eq!(
        ds.into_buffer(&Palette::reference()).unwrap_err(),
        ValidationError::CategoryOutOfRange {
            index: 3,
            category: 5,
            palette_len: 4,
        }
    );
}
