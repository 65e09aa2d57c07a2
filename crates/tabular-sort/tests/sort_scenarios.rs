use std::cmp::Ordering;
use tabular_columnar::Column;
use tabular_sort::{make_composite_sorter, make_sorter, Direction};

fn ref_cmp<T: PartialOrd>(a: Option<T>, b: Option<T>, direction: Direction) -> Ordering {
    let ord = match (&a, &b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.partial_cmp(y).expect("reference values are comparable"),
    };
    match direction {
        Direction::Ascending => ord,
        Direction::Descending => ord.reverse(),
    }
}

/// Stable argsort against the engine's contract, used as the trusted
/// reference: NA first ascending / last descending, ties keep row order.
fn reference_order<T: PartialOrd + Copy>(
    values: &[Option<T>],
    direction: Direction,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| ref_cmp(values[a], values[b], direction));
    order
}

fn sort_i32(values: Vec<Option<i32>>, direction: Direction) -> (Vec<usize>, Vec<usize>) {
    let col = Column::int32s(values);
    let sorter = make_sorter(&col, direction).expect("int32 is sortable");
    let result = sorter.sort(true);
    (
        result.order.to_usizes(),
        result.groups.expect("grouping requested").to_usizes(),
    )
}

#[test]
fn float_total_order_scenario() {
    // NA and NaN form one invalid-first group; -0.0 and 0.0 tie.
    let col = Column::float64s([
        Some(-0.0),
        Some(0.0),
        Some(f64::NAN),
        Some(-1.5),
        Some(2.5),
        None,
    ]);
    let sorter = make_sorter(&col, Direction::Ascending).unwrap();
    let result = sorter.sort(true);

    assert_eq!(result.order.to_usizes(), vec![2, 5, 3, 0, 1, 4]);
    assert_eq!(result.groups.unwrap().to_usizes(), vec![0, 2, 3, 5, 6]);
}

#[test]
fn float_total_order_scenario_descending() {
    let col = Column::float64s([
        Some(-0.0),
        Some(0.0),
        Some(f64::NAN),
        Some(-1.5),
        Some(2.5),
        None,
    ]);
    let sorter = make_sorter(&col, Direction::Descending).unwrap();
    let result = sorter.sort(true);

    // Valid values descending, the invalid group moves to the back.
    assert_eq!(result.order.to_usizes(), vec![4, 0, 1, 3, 2, 5]);
    assert_eq!(result.groups.unwrap().to_usizes(), vec![0, 1, 3, 4, 6]);
}

#[test]
fn composite_sort_breaks_ties_with_second_column() {
    let cols = vec![
        Column::int32s([Some(1), Some(1), Some(2), Some(2)]),
        Column::int32s([Some(5), Some(3), Some(5), Some(3)]),
    ];
    let sorter = make_composite_sorter(&cols, &[Direction::Ascending; 2]).unwrap();
    let result = sorter.sort(true);

    // (A=1,B=3), (A=1,B=5), (A=2,B=3), (A=2,B=5)
    assert_eq!(result.order.to_usizes(), vec![1, 0, 3, 2]);
    assert_eq!(result.groups.unwrap().to_usizes(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn composite_sort_honors_per_column_directions() {
    let cols = vec![
        Column::int32s([Some(1), Some(1), Some(2), Some(2)]),
        Column::int32s([Some(5), Some(3), Some(5), Some(3)]),
    ];
    let sorter =
        make_composite_sorter(&cols, &[Direction::Ascending, Direction::Descending]).unwrap();
    let result = sorter.sort(true);

    assert_eq!(result.order.to_usizes(), vec![0, 1, 2, 3]);
    assert_eq!(result.groups.unwrap().to_usizes(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn composite_sort_skips_grouping_when_not_requested() {
    let cols = vec![
        Column::int32s([Some(2), Some(1)]),
        Column::int32s([Some(1), Some(2)]),
    ];
    let sorter = make_composite_sorter(&cols, &[Direction::Ascending; 2]).unwrap();
    let result = sorter.sort(false);

    assert_eq!(result.order.to_usizes(), vec![1, 0]);
    assert!(result.groups.is_none());
}

#[test]
fn composite_three_columns_recurse_through_tie_groups() {
    let a = [1, 1, 1, 1, 2, 2];
    let b = [7, 7, 3, 3, 9, 9];
    let c = [1, 0, 5, 5, 2, 1];
    let cols = vec![
        Column::int32s(a.map(Some)),
        Column::int32s(b.map(Some)),
        Column::int32s(c.map(Some)),
    ];
    let sorter = make_composite_sorter(&cols, &[Direction::Ascending; 3]).unwrap();
    let result = sorter.sort(true);

    // Rows sorted by (a, b, c): (1,3,5)x2 stable, (1,7,0), (1,7,1), (2,9,1), (2,9,2).
    assert_eq!(result.order.to_usizes(), vec![2, 3, 1, 0, 5, 4]);
    assert_eq!(result.groups.unwrap().to_usizes(), vec![0, 2, 3, 4, 5, 6]);
}

#[test]
fn bool_column_groups_na_false_true() {
    let col = Column::bools([Some(true), None, Some(false), Some(true), Some(false)]);
    let sorter = make_sorter(&col, Direction::Ascending).unwrap();
    let result = sorter.sort(true);

    assert_eq!(result.order.to_usizes(), vec![1, 2, 4, 0, 3]);
    assert_eq!(result.groups.unwrap().to_usizes(), vec![0, 1, 3, 5]);
}

#[test]
fn na_rows_form_leading_group_ascending_and_trailing_descending() {
    let values = vec![Some(4i32), None, Some(-2), None, Some(4)];

    let (asc_order, asc_groups) = sort_i32(values.clone(), Direction::Ascending);
    assert_eq!(asc_order, vec![1, 3, 2, 0, 4]);
    assert_eq!(asc_groups, vec![0, 2, 3, 5]);

    let (desc_order, desc_groups) = sort_i32(values, Direction::Descending);
    assert_eq!(desc_order, vec![0, 4, 2, 1, 3]);
    assert_eq!(desc_groups, vec![0, 2, 3, 5]);
}

#[test]
fn already_sorted_input_returns_identity_even_with_ties() {
    let values = vec![Some(1), Some(1), Some(2), Some(2), Some(3)];
    let (order, groups) = sort_i32(values, Direction::Ascending);
    assert_eq!(order, vec![0, 1, 2, 3, 4]);
    assert_eq!(groups, vec![0, 2, 4, 5]);
}

#[test]
fn empty_and_single_row_columns() {
    let (order, groups) = sort_i32(Vec::new(), Direction::Ascending);
    assert!(order.is_empty());
    assert_eq!(groups, vec![0]);

    let (order, groups) = sort_i32(vec![Some(7)], Direction::Descending);
    assert_eq!(order, vec![0]);
    assert_eq!(groups, vec![0, 1]);
}

#[test]
fn grouping_is_omitted_when_not_requested() {
    let col = Column::int32s([Some(2), Some(1), Some(2)]);
    let sorter = make_sorter(&col, Direction::Ascending).unwrap();
    let result = sorter.sort(false);
    assert_eq!(result.order.to_usizes(), vec![1, 0, 2]);
    assert!(result.groups.is_none());
}

fn pseudo_random_i32s(n: usize, modulus: i32, na_every: u64) -> Vec<Option<i32>> {
    // Deterministic xorshift payload; no RNG crate needed for fixtures that
    // tests assert exact permutations on.
    let mut state = 0x9E3779B97F4A7C15u64;
    (0..n)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            if state % na_every == 0 {
                None
            } else {
                Some((state >> 17) as i32 % modulus)
            }
        })
        .collect()
}

#[test]
fn results_are_identical_across_the_small_sort_threshold() {
    let threshold = tabular_sort::constants::COMPARISON_SORT_NROWS;
    for n in [threshold - 1, threshold, threshold + 1] {
        let values = pseudo_random_i32s(n, 50, 11);
        let (order, _) = sort_i32(values.clone(), Direction::Ascending);
        assert_eq!(
            order,
            reference_order(&values, Direction::Ascending),
            "size {n}"
        );
    }
}

#[test]
fn radix_recursion_matches_reference_on_wide_ranges() {
    // Range needs several 8-bit passes; recursion and bucket small sorts
    // all get exercised.
    for direction in [Direction::Ascending, Direction::Descending] {
        let values = pseudo_random_i32s(20_000, 1_000_000_000, 17);
        let (order, groups) = sort_i32(values.clone(), direction);
        assert_eq!(order, reference_order(&values, direction));

        assert_eq!(groups[0], 0);
        assert_eq!(*groups.last().unwrap(), values.len());
        for w in groups.windows(2) {
            assert!(w[0] < w[1]);
        }
    }
}

#[test]
fn parallel_chunked_path_matches_reference() {
    // Large enough that the histogram/scatter phases run on several chunks
    // when a pool is available.
    let values = pseudo_random_i32s(200_000, 5_000, 23);
    let (order, _) = sort_i32(values.clone(), Direction::Ascending);
    assert_eq!(order, reference_order(&values, Direction::Ascending));
}

#[test]
fn narrow_types_take_single_pass_radix() {
    let values: Vec<Option<i8>> = pseudo_random_i32s(4_000, 120, 9)
        .into_iter()
        .map(|v| v.map(|x| x as i8))
        .collect();
    let col = Column::int8s(values.clone());
    let sorter = make_sorter(&col, Direction::Ascending).unwrap();
    let result = sorter.sort(true);

    assert_eq!(
        result.order.to_usizes(),
        reference_order(&values, Direction::Ascending)
    );

    // Group count equals the number of distinct keys (plus the NA block).
    let mut distinct: Vec<Option<i8>> = values.clone();
    distinct.sort_by(|a, b| ref_cmp(*a, *b, Direction::Ascending));
    distinct.dedup();
    assert_eq!(result.groups.unwrap().to_usizes().len() - 1, distinct.len());
}

#[test]
fn float32_radix_handles_nan_and_infinities() {
    let mut values: Vec<Option<f32>> = pseudo_random_i32s(6_000, 1_000_000, 13)
        .into_iter()
        .map(|v| v.map(|x| x as f32 / 3.0))
        .collect();
    values[17] = Some(f32::NAN);
    values[400] = Some(f32::INFINITY);
    values[401] = Some(f32::NEG_INFINITY);

    let col = Column::float32s(values.clone());
    let sorter = make_sorter(&col, Direction::Ascending).unwrap();
    let result = sorter.sort(true);
    let order = result.order.to_usizes();

    // NaN counts as invalid for the reference too.
    let normalized: Vec<Option<f32>> =
        values.iter().map(|v| v.filter(|x| !x.is_nan())).collect();
    assert_eq!(order, reference_order(&normalized, Direction::Ascending));
}

#[test]
fn full_domain_int64_falls_back_to_comparison_sort() {
    // min = i64::MIN and max = i64::MAX would wrap the radix key space.
    let mut values = pseudo_random_i32s(600, 1_000_000, 29)
        .into_iter()
        .map(|v| v.map(|x| x as i64))
        .collect::<Vec<_>>();
    values[10] = Some(i64::MIN);
    values[11] = Some(i64::MAX);

    let col = Column::int64s(values.clone());
    let sorter = make_sorter(&col, Direction::Ascending).unwrap();
    let result = sorter.sort(true);
    assert_eq!(
        result.order.to_usizes(),
        reference_order(&values, Direction::Ascending)
    );
}

#[test]
fn constant_column_with_nas_still_partitions() {
    let mut values = vec![Some(5i32); 3_000];
    for i in (0..3_000).step_by(7) {
        values[i] = None;
    }
    let (order, groups) = sort_i32(values.clone(), Direction::Ascending);

    let na_count = values.iter().filter(|v| v.is_none()).count();
    assert!(order[..na_count].iter().all(|&i| values[i].is_none()));
    assert!(order[na_count..].iter().all(|&i| values[i].is_some()));
    assert_eq!(groups, vec![0, na_count, values.len()]);
}
