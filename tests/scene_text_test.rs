// End-to-end checks of the text scene output
use scene_mesh::{
    parse_scene_str, BoundingBox, Coordinate, Feature, Geometry, OutputFormat, SceneBuilder,
    SceneConfig, SceneNode, VecCursor,
};

fn values<'a>(mesh: &'a SceneNode, name: &str) -> Vec<&'a str> {
    mesh.children
        .iter()
        .find(|c| c.attribute("name") == Some(name))
        .and_then(|c| c.text.as_deref())
        .map(|t| t.split_whitespace().collect())
        .unwrap_or_default()
}

fn floats(mesh: &SceneNode, name: &str) -> Vec<f64> {
    values(mesh, name).iter().map(|v| v.parse().unwrap()).collect()
}

fn build_text(bbox: BoundingBox, config: SceneConfig, features: Vec<Feature>) -> String {
    let mut builder = SceneBuilder::new(bbox, config);
    builder.add_layer(&mut VecCursor::new(features)).expect("layer should build");
    let mut out = Vec::new();
    builder
        .finalize_and_write(OutputFormat::SceneText, &mut out)
        .expect("scene should write");
    String::from_utf8(out).expect("scene text is UTF-8")
}

#[test]
fn test_single_square_scene() {
    let square = Geometry::Polygon(vec![vec![
        Coordinate::new(0.0, 0.0, 0.0),
        Coordinate::new(10.0, 0.0, 0.0),
        Coordinate::new(10.0, 10.0, 0.0),
        Coordinate::new(0.0, 10.0, 0.0),
        Coordinate::new(0.0, 0.0, 0.0),
    ]]);
    let text = build_text(
        BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        SceneConfig::default(),
        vec![Feature::new().with_geometry("the_geom", square)],
    );
    println!("{}", text);
    assert!(text.starts_with(r#"<group id="Polygon" class="layer"><mesh type="triangles">"#));

    let root = parse_scene_str(&text).expect("output should parse");
    let meshes = root.find_all("mesh");
    assert_eq!(meshes.len(), 1);
    let mesh = meshes[0];

    assert_eq!(values(mesh, "index"), vec!["0", "1", "2", "2", "3", "0"]);
    assert_eq!(floats(mesh, "position").len(), 4 * 3);
    assert_eq!(
        floats(mesh, "position"),
        vec![0.0, 0.0, 10.0, 10.0, 0.0, 10.0, 10.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    );
    assert_eq!(floats(mesh, "texcoord"), vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);

    let normals = floats(mesh, "normal");
    for n in normals.chunks_exact(3) {
        assert_eq!(n, &[0.0, 1.0, 0.0]);
    }

    let kinds: Vec<&str> = mesh.children.iter().map(|c| c.tag.as_deref().unwrap()).collect();
    assert_eq!(kinds, vec!["int", "float3", "float3", "float2"]);
}

#[test]
fn test_terrain_normals_are_unit_length() {
    // 6x6 quads over a bumpy surface
    let height = |x: f64, y: f64| (x * 0.7).sin() * 3.0 + (y * 0.3).cos() * 2.0;
    let mut features = Vec::new();
    for i in 0..6 {
        for j in 0..6 {
            let (x, y) = (i as f64 * 10.0, j as f64 * 10.0);
            let ring = vec![
                Coordinate::new(x, y, height(x, y)),
                Coordinate::new(x + 10.0, y, height(x + 10.0, y)),
                Coordinate::new(x + 10.0, y + 10.0, height(x + 10.0, y + 10.0)),
                Coordinate::new(x, y + 10.0, height(x, y + 10.0)),
                Coordinate::new(x, y, height(x, y)),
            ];
            features.push(Feature::new().with_geometry("geom", Geometry::Polygon(vec![ring])));
        }
    }

    let text = build_text(BoundingBox::new(0.0, 0.0, 60.0, 60.0), SceneConfig::default(), features);
    let root = parse_scene_str(&text).unwrap();
    let mesh = root.find_all("mesh")[0];

    let indices = values(mesh, "index");
    assert_eq!(indices.len() % 3, 0);
    assert_eq!(floats(mesh, "position").len() / 3, 49);

    for n in floats(mesh, "normal").chunks_exact(3) {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        // six decimals per component in the text form
        assert!((len - 1.0).abs() < 1e-5, "normal length {}", len);
        assert!(n[1] > 0.0);
    }
}

#[test]
fn test_mixed_layer_with_lines_and_points() {
    let config = SceneConfig {
        id_attribute: Some("fid".to_string()),
        class_attributes: vec!["kind".to_string()],
        pretty: true,
        ..SceneConfig::default()
    };
    let features = vec![
        Feature::new()
            .with_geometry(
                "geom",
                Geometry::LineString(vec![Coordinate::xy(1.0, 1.0), Coordinate::xy(4.0, 5.0)]),
            )
            .with_text("fid", "road.1")
            .with_text("kind", "track"),
        Feature::new()
            .with_geometry("geom", Geometry::Point(Coordinate::new(2.0, 2.0, 1.0)))
            .with_text("fid", "lamp.1")
            .with_text("mesh_ref", "lamp.xml#mesh"),
    ];
    let text = build_text(BoundingBox::new(0.0, 0.0, 10.0, 10.0), config, features);
    println!("{}", text);

    let root = parse_scene_str(&text).unwrap();
    let group = &root.children[0];
    assert_eq!(group.attribute("id"), Some("LineString"));
    assert_eq!(group.children.len(), 2);

    let line = &group.children[0];
    assert_eq!(line.attribute("type"), Some("line"));
    assert_eq!(line.attribute("id"), Some("road.1"));
    assert_eq!(line.attribute("class"), Some("track"));
    assert_eq!(values(line, "index"), vec!["0", "1"]);

    let lamp = &group.children[1];
    assert_eq!(lamp.tag.as_deref(), Some("group"));
    assert_eq!(lamp.attribute("id"), Some("lamp.1"));
    assert_eq!(lamp.attribute("translation"), Some("2.0 1.0 2.0"));
    assert_eq!(lamp.children[0].attribute("src"), Some("lamp.xml#mesh"));
}
