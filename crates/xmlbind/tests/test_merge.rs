use helios_xmlbind::{Field, RecordSchema, Result, XmlBind, from_xml_str};

#[derive(Debug, Default)]
struct Letters {
    a: Vec<String>,
}

impl XmlBind for Letters {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("a", |l: &mut Letters| &mut l.a);
    }
}

#[derive(Debug, Default)]
struct LettersWithB {
    a: Vec<String>,
    b: Option<String>,
}

impl XmlBind for LettersWithB {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("a", |l: &mut LettersWithB| &mut l.a)
            .field("b", |l: &mut LettersWithB| &mut l.b);
    }
}

#[derive(Debug, Default)]
struct Node {
    name: String,
    children: Vec<Node>,
    data: Vec<i32>,
}

impl XmlBind for Node {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("name", |n: &mut Node| &mut n.name)
            .field("node", |n: &mut Node| &mut n.children)
            .field("data", |n: &mut Node| &mut n.data);
    }
}

#[derive(Debug, Default)]
struct Fixed {
    items: Box<[u8]>,
}

impl XmlBind for Fixed {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("i", |f: &mut Fixed| &mut f.items);
    }
}

#[derive(Debug, Default)]
struct Optional {
    items: Option<Vec<i32>>,
}

impl XmlBind for Optional {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("i", |o: &mut Optional| &mut o.items);
    }
}

#[derive(Debug, Default)]
struct Wrapped {
    items: Vec<i32>,
    other: Option<i32>,
}

impl XmlBind for Wrapped {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field(Field::named("i").wrapper("items"), |w: &mut Wrapped| {
                &mut w.items
            })
            .field("other", |w: &mut Wrapped| &mut w.other);
    }
}

#[derive(Debug, Default)]
struct Point {
    x: i32,
    y: i32,
}

impl XmlBind for Point {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("x", |p: &mut Point| &mut p.x)
            .field("y", |p: &mut Point| &mut p.y);
    }
}

#[test]
fn test_merge_across_unknown_sibling() -> Result<()> {
    let letters: Letters = from_xml_str("<r><a>x</a><b>y</b><a>z</a></r>")?;
    assert_eq!(letters.a, ["x", "z"]);
    Ok(())
}

#[test]
fn test_merge_across_mapped_sibling() -> Result<()> {
    let letters: LettersWithB = from_xml_str("<r><a>x</a><b>y</b><a>z</a><a>w</a></r>")?;
    assert_eq!(letters.a, ["x", "z", "w"]);
    assert_eq!(letters.b.as_deref(), Some("y"));
    Ok(())
}

#[test]
fn test_interleaved_tree_keeps_document_order() -> Result<()> {
    let xml = r#"
        <node name="root">
            <data>1</data>
            <node name="a"><data>10</data></node>
            <data>2</data>
            <node name="b">
                <node name="b1"/>
                <data>20</data>
                <node name="b2"/>
            </node>
            <data>3</data>
        </node>"#;
    let root: Node = from_xml_str(xml)?;
    assert_eq!(root.name, "root");
    assert_eq!(root.data, vec![1, 2, 3]);

    let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["a", "b"]);
    assert_eq!(root.children[0].data, vec![10]);

    let b = &root.children[1];
    assert_eq!(b.data, vec![20]);
    let names: Vec<&str> = b.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["b1", "b2"]);
    Ok(())
}

#[test]
fn test_deeply_nested_recursive_type() -> Result<()> {
    let depth = 50;
    let mut xml = String::new();
    for i in 0..depth {
        xml.push_str(&format!("<node name=\"n{}\">", i));
    }
    xml.push_str(&"</node>".repeat(depth));

    let mut node: Node = from_xml_str(&xml)?;
    let mut seen = 1;
    while let Some(child) = node.children.pop() {
        node = child;
        seen += 1;
    }
    assert_eq!(seen, depth);
    assert_eq!(node.name, format!("n{}", depth - 1));
    Ok(())
}

#[test]
fn test_fixed_array_is_rebuilt_across_runs() -> Result<()> {
    let fixed: Fixed = from_xml_str("<f><i>1</i><i>2</i><skip/><i>3</i></f>")?;
    assert_eq!(&*fixed.items, &[1, 2, 3]);
    Ok(())
}

#[test]
fn test_optional_collection() -> Result<()> {
    let absent: Optional = from_xml_str("<o/>")?;
    assert_eq!(absent.items, None);

    let present: Optional = from_xml_str("<o><i>1</i><x/><i>2</i></o>")?;
    assert_eq!(present.items, Some(vec![1, 2]));
    Ok(())
}

#[test]
fn test_wrapped_collection_is_replaced_not_merged() -> Result<()> {
    let xml = "<w><items><i>1</i><i>2</i></items><other>0</other><items><i>3</i></items></w>";
    let wrapped: Wrapped = from_xml_str(xml)?;
    assert_eq!(wrapped.items, vec![3]);
    assert_eq!(wrapped.other, Some(0));
    Ok(())
}

#[test]
fn test_attribute_does_not_merge() -> Result<()> {
    // The attribute sets the collection to one element; the element run that
    // follows is the first run and replaces it.
    let letters: Letters = from_xml_str(r#"<r a="attr"><a>x</a><b/><a>y</a></r>"#)?;
    assert_eq!(letters.a, ["x", "y"]);

    let letters: Letters = from_xml_str(r#"<r a="attr"/>"#)?;
    assert_eq!(letters.a, ["attr"]);
    Ok(())
}

#[test]
fn test_root_collection_of_scalars() -> Result<()> {
    let values: Vec<i32> = from_xml_str("<list><n>1</n><n>2</n><n>3</n></list>")?;
    assert_eq!(values, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_root_collection_resumes_after_interruption() -> Result<()> {
    let values: Vec<String> =
        from_xml_str("<list><n>a</n><comment>skip me</comment><n>b</n>loose text<n>c</n></list>")?;
    assert_eq!(values, ["a", "b", "c"]);
    Ok(())
}

#[test]
fn test_root_collection_of_records() -> Result<()> {
    let xml = r#"<points><point x="1" y="2"/><point><x>3</x><y>4</y></point></points>"#;
    let points: Box<[Point]> = from_xml_str(xml)?;
    assert_eq!(points.len(), 2);
    assert_eq!((points[0].x, points[0].y), (1, 2));
    assert_eq!((points[1].x, points[1].y), (3, 4));
    Ok(())
}

#[test]
fn test_empty_root_collection() -> Result<()> {
    let values: Vec<i32> = from_xml_str("<list/>")?;
    assert!(values.is_empty());

    let values: Option<Vec<i32>> = from_xml_str("<list></list>")?;
    assert_eq!(values, Some(Vec::new()));
    Ok(())
}
