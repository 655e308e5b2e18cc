// Sub-mesh splitting at the vertex ceiling
use scene_mesh::{
    BoundingBox, Coordinate, Feature, Geometry, SceneBuilder, SceneConfig, SceneNode, VecCursor,
};

fn quad_grid(cells: usize) -> Vec<Feature> {
    let mut features = Vec::with_capacity(cells * cells);
    for i in 0..cells {
        for j in 0..cells {
            let (x, y) = (i as f64, j as f64);
            let ring = vec![
                Coordinate::new(x, y, 0.0),
                Coordinate::new(x + 1.0, y, 0.0),
                Coordinate::new(x + 1.0, y + 1.0, 0.0),
                Coordinate::new(x, y + 1.0, 0.0),
                Coordinate::new(x, y, 0.0),
            ];
            features.push(Feature::new().with_geometry("geom", Geometry::Polygon(vec![ring])));
        }
    }
    features
}

fn count(mesh: &SceneNode, name: &str) -> Vec<usize> {
    mesh.children
        .iter()
        .find(|c| c.attribute("name") == Some(name))
        .and_then(|c| c.text.as_deref())
        .map(|t| {
            t.split_whitespace()
                .map(|v| v.parse::<f64>().unwrap() as usize)
                .collect()
        })
        .unwrap_or_default()
}

fn check_meshes(root: &SceneNode, ceiling: usize) -> usize {
    let meshes = root.find_all("mesh");
    for mesh in &meshes {
        let vertex_count = count(mesh, "position").len() / 3;
        let indices = count(mesh, "index");
        assert!(vertex_count <= ceiling, "sub-mesh with {} vertices", vertex_count);
        assert_eq!(indices.len() % 3, 0);
        assert!(indices.iter().all(|&i| i < vertex_count));
        assert_eq!(count(mesh, "normal").len(), vertex_count * 3);
        assert_eq!(count(mesh, "texcoord").len(), vertex_count * 2);
    }
    meshes.len()
}

#[test]
fn test_large_terrain_is_split() {
    // 261 x 261 distinct corners, more than one default ceiling
    let cells = 260;
    let mut builder = SceneBuilder::new(
        BoundingBox::new(0.0, 0.0, cells as f64, cells as f64),
        SceneConfig::default(),
    );
    builder.add_layer(&mut VecCursor::new(quad_grid(cells))).unwrap();
    let (root, stats) = builder.into_scene();

    let meshes = check_meshes(&root, 63_000);
    assert!(meshes > 1);
    assert_eq!(stats.meshes, meshes);
    assert!(stats.vertices >= 261 * 261);
}

#[test]
fn test_small_ceiling_splits_often() {
    let config = SceneConfig {
        max_vertices_per_mesh: 50,
        ..SceneConfig::default()
    };
    let mut builder = SceneBuilder::new(BoundingBox::new(0.0, 0.0, 20.0, 20.0), config);
    builder.add_layer(&mut VecCursor::new(quad_grid(20))).unwrap();
    let (root, stats) = builder.into_scene();

    let meshes = check_meshes(&root, 50);
    // 441 corners cannot fit in fewer than 9 sub-meshes of 50
    assert!(meshes >= 9);
    assert_eq!(stats.meshes, meshes);

    let triangles: usize = root
        .find_all("mesh")
        .iter()
        .map(|m| count(m, "index").len() / 3)
        .sum();
    assert_eq!(triangles, 20 * 20 * 2);
}

#[test]
fn test_under_ceiling_stays_whole() {
    let mut builder = SceneBuilder::new(BoundingBox::new(0.0, 0.0, 10.0, 10.0), SceneConfig::default());
    builder.add_layer(&mut VecCursor::new(quad_grid(10))).unwrap();
    let (root, stats) = builder.into_scene();
    assert_eq!(check_meshes(&root, 63_000), 1);
    assert_eq!(stats.vertices, 121);
}
