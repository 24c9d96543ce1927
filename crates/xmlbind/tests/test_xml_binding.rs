use helios_xmlbind::{
    BindConfig, BindError, ConvertError, Converter, Field, ParseError, RecordSchema, Result,
    XmlBind, XmlBinder, from_xml_reader, from_xml_slice, from_xml_str, xml_enum,
};

xml_enum! {
    #[derive(Debug, Clone, PartialEq)]
    enum AddressUse {
        Home,
        Work,
    }
}

#[derive(Debug, Default, PartialEq)]
struct Address {
    kind: Option<String>,
    street: Option<String>,
    city: Option<String>,
    usage: Option<AddressUse>,
}

impl XmlBind for Address {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("type", |a: &mut Address| &mut a.kind)
            .field("street", |a: &mut Address| &mut a.street)
            .field("city", |a: &mut Address| &mut a.city)
            .field("use", |a: &mut Address| &mut a.usage);
    }
}

#[derive(Debug, Default)]
struct Numbers {
    values: Vec<i32>,
}

impl XmlBind for Numbers {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("v", |n: &mut Numbers| &mut n.values);
    }
}

#[derive(Debug, Default)]
struct WrappedNumbers {
    values: Vec<i32>,
}

impl XmlBind for WrappedNumbers {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema.construct_default().field(
            Field::named("v").wrapper("values"),
            |n: &mut WrappedNumbers| &mut n.values,
        );
    }
}

#[derive(Debug, Default)]
struct Sample {
    flag: bool,
    count: Option<u32>,
    ratio: f64,
    initial: Option<char>,
    note: Option<String>,
}

impl XmlBind for Sample {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("flag", |s: &mut Sample| &mut s.flag)
            .field("count", |s: &mut Sample| &mut s.count)
            .field("ratio", |s: &mut Sample| &mut s.ratio)
            .field("initial", |s: &mut Sample| &mut s.initial)
            .field("note", |s: &mut Sample| &mut s.note);
    }
}

#[derive(Debug, Default)]
struct Price {
    currency: String,
    amount: Option<rust_decimal::Decimal>,
}

impl XmlBind for Price {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("currency", |p: &mut Price| &mut p.currency)
            .field(Field::own_value(), |p: &mut Price| &mut p.amount);
    }
}

#[derive(Debug, Default)]
struct Words {
    items: Vec<String>,
}

impl XmlBind for Words {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("w", |w: &mut Words| &mut w.items);
    }
}

/// Reads `<tag/>` as an empty string instead of no value.
#[derive(Default)]
struct SafeString;

impl Converter for SafeString {
    type Output = String;

    fn convert(&self, text: Option<&str>) -> std::result::Result<Option<String>, ConvertError> {
        Ok(Some(text.unwrap_or_default().to_string()))
    }
}

#[derive(Debug, Default)]
struct SafeWords {
    items: Vec<String>,
    title: Option<String>,
}

impl XmlBind for SafeWords {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field(Field::named("w").mapper::<SafeString>(), |w: &mut SafeWords| {
                &mut w.items
            })
            .field(Field::named("title").mapper::<SafeString>(), |w: &mut SafeWords| {
                &mut w.title
            });
    }
}

#[derive(Debug, Default)]
struct FileEntry {
    name: Option<String>,
    kind: Option<String>,
    content: Option<String>,
}

impl XmlBind for FileEntry {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field("name", |f: &mut FileEntry| &mut f.name)
            .field("type", |f: &mut FileEntry| &mut f.kind)
            .field(Field::own_value(), |f: &mut FileEntry| &mut f.content);
    }
}

#[derive(Default)]
struct Upper;

impl Converter for Upper {
    type Output = String;

    fn convert(&self, text: Option<&str>) -> std::result::Result<Option<String>, ConvertError> {
        Ok(text.map(str::to_uppercase))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Rgb(u8, u8, u8);

impl XmlBind for Rgb {}

#[derive(Default)]
struct HexColor;

impl Converter for HexColor {
    type Output = Rgb;

    fn convert(&self, text: Option<&str>) -> std::result::Result<Option<Rgb>, ConvertError> {
        let Some(text) = text else {
            return Ok(None);
        };
        let hex = text
            .strip_prefix('#')
            .filter(|h| h.len() == 6)
            .ok_or_else(|| format!("not a color: {}", text))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| ConvertError::Custom(e.to_string()))
        };
        Ok(Some(Rgb(channel(0)?, channel(2)?, channel(4)?)))
    }
}

#[derive(Debug, Default)]
struct Palette {
    name: String,
    colors: Vec<Rgb>,
    accent: Option<Rgb>,
}

impl XmlBind for Palette {
    fn describe(schema: &mut RecordSchema<'_, Self>) {
        schema
            .construct_default()
            .field(Field::named("name").mapper::<Upper>(), |p: &mut Palette| {
                &mut p.name
            })
            .field(Field::named("color").mapper::<HexColor>(), |p: &mut Palette| {
                &mut p.colors
            })
            .field(Field::named("accent").mapper::<HexColor>(), |p: &mut Palette| {
                &mut p.accent
            });
    }
}

#[test]
fn test_unwrapped_repeated_elements() -> Result<()> {
    let numbers: Numbers = from_xml_str("<r><v>1</v><v>2</v><v>3</v></r>")?;
    assert_eq!(numbers.values, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_wrapped_repeated_elements() -> Result<()> {
    let numbers: WrappedNumbers = from_xml_str("<r><values><v>1</v><v>2</v></values></r>")?;
    assert_eq!(numbers.values, vec![1, 2]);
    Ok(())
}

#[test]
fn test_missing_wrapper_fails() {
    let err = from_xml_str::<WrappedNumbers>("<r><v>1</v><v>2</v></r>").unwrap_err();
    match err {
        BindError::Parse(ParseError::MissingWrapper {
            element, wrapper, ..
        }) => {
            assert_eq!(element, "v");
            assert_eq!(wrapper, "values");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_attribute_and_element_share_one_key() -> Result<()> {
    let from_attribute: Address = from_xml_str(r#"<addr type="home"><city>Oslo</city></addr>"#)?;
    let from_element: Address = from_xml_str("<addr><type>home</type><city>Oslo</city></addr>")?;
    assert_eq!(from_attribute, from_element);
    assert_eq!(from_attribute.kind.as_deref(), Some("home"));
    Ok(())
}

#[test]
fn test_self_closing_scalar_yields_null_result() -> Result<()> {
    let sample: Sample = from_xml_str("<s><flag/><count/><ratio/><note/></s>")?;
    assert!(!sample.flag);
    assert_eq!(sample.count, None);
    assert_eq!(sample.ratio, 0.0);
    assert_eq!(sample.note, None);
    Ok(())
}

#[test]
fn test_self_closing_string_member_is_invalid() {
    let err = from_xml_str::<Words>("<r><w>a</w><w/></r>").unwrap_err();
    assert!(matches!(
        err,
        BindError::Parse(ParseError::InvalidElement { ref name, .. }) if name == "w"
    ), "{}", err);
}

#[test]
fn test_converter_maps_missing_text_to_empty_string() -> Result<()> {
    let words: SafeWords = from_xml_str("<r><w>a</w><w/><w>b</w><title/></r>")?;
    assert_eq!(words.items, ["a", "", "b"]);
    assert_eq!(words.title.as_deref(), Some(""));
    Ok(())
}

#[test]
fn test_unknown_tags_and_attributes_are_skipped() -> Result<()> {
    let xml = r#"
        <addr type="work" lang="en">
            <extra><deep a="1"><deeper/></deep>text</extra>
            <street>Main</street>
            <unknown/>
            <city>Bergen</city>
        </addr>"#;
    let address: Address = from_xml_str(xml)?;
    assert_eq!(address.kind.as_deref(), Some("work"));
    assert_eq!(address.street.as_deref(), Some("Main"));
    assert_eq!(address.city.as_deref(), Some("Bergen"));
    Ok(())
}

#[test]
fn test_scalar_conversions() -> Result<()> {
    let xml = "<s><flag>true</flag><count>42</count><ratio>-0.25</ratio><initial>Zed</initial></s>";
    let sample: Sample = from_xml_str(xml)?;
    assert!(sample.flag);
    assert_eq!(sample.count, Some(42));
    assert_eq!(sample.ratio, -0.25);
    assert_eq!(sample.initial, Some('Z'));
    assert_eq!(sample.note, None);
    Ok(())
}

#[test]
fn test_malformed_number_is_a_field_error() {
    let err = from_xml_str::<Sample>("<s><count>many</count></s>").unwrap_err();
    match err {
        BindError::Parse(ParseError::Conversion { field, source, .. }) => {
            assert_eq!(field, "count");
            assert_eq!(
                source,
                ConvertError::Invalid {
                    kind: "u32",
                    text: "many".to_string()
                }
            );
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_malformed_attribute_value_is_a_field_error() {
    let err = from_xml_str::<Sample>(r#"<s flag="maybe"/>"#).unwrap_err();
    assert!(matches!(
        err,
        BindError::Parse(ParseError::Conversion { ref field, .. }) if field == "flag"
    ));
}

#[test]
fn test_enum_members_match_case_sensitively() -> Result<()> {
    let address: Address = from_xml_str("<a><use>Work</use></a>")?;
    assert_eq!(address.usage, Some(AddressUse::Work));

    let address: Address = from_xml_str(r#"<a use="Home"/>"#)?;
    assert_eq!(address.usage, Some(AddressUse::Home));

    let address: Address = from_xml_str("<a><use>work</use></a>")?;
    assert_eq!(address.usage, None);
    Ok(())
}

#[test]
fn test_own_value_with_attribute() -> Result<()> {
    let price: Price = from_xml_str(r#"<price currency="EUR"> 12.50 </price>"#)?;
    assert_eq!(price.currency, "EUR");
    assert_eq!(price.amount, Some(rust_decimal_macros::dec!(12.50)));

    let price: Price = from_xml_str(r#"<price currency="NOK"/>"#)?;
    assert_eq!(price.amount, None);
    Ok(())
}

#[test]
fn test_untrimmed_whitespace_before_children() -> Result<()> {
    let binder = XmlBinder::with_config(BindConfig {
        trim_text: false,
        ..Default::default()
    });
    let file: FileEntry = binder.from_str("<file name=\"a\">\n  <type>t</type>\n</file>")?;
    assert_eq!(file.name.as_deref(), Some("a"));
    assert_eq!(file.kind.as_deref(), Some("t"));
    assert_eq!(file.content, None);

    let file: FileEntry = binder.from_str("<file name=\"b\">  </file>")?;
    assert_eq!(file.content.as_deref(), Some("  "));

    let file: FileEntry = binder.from_str("<file>\n  data\n</file>")?;
    assert_eq!(file.content.as_deref(), Some("\n  data\n"));
    Ok(())
}

#[test]
fn test_mixed_content_fails() {
    let err = from_xml_str::<Price>(r#"<price currency="EUR">12<b>x</b></price>"#).unwrap_err();
    assert!(matches!(err, BindError::Parse(ParseError::Mismatch { .. })), "{}", err);
}

#[test]
fn test_scalar_with_child_element_fails() {
    let err = from_xml_str::<Sample>("<s><count><n>1</n></count></s>").unwrap_err();
    assert!(matches!(err, BindError::Parse(ParseError::Mismatch { .. })), "{}", err);
}

#[test]
fn test_custom_converters() -> Result<()> {
    let xml = r##"
        <palette name="warm" accent="#00ff00">
            <color>#ff0000</color>
            <color>#ff8000</color>
        </palette>"##;
    let palette: Palette = from_xml_str(xml)?;
    assert_eq!(palette.name, "WARM");
    assert_eq!(palette.colors, vec![Rgb(255, 0, 0), Rgb(255, 128, 0)]);
    assert_eq!(palette.accent, Some(Rgb(0, 255, 0)));
    Ok(())
}

#[test]
fn test_custom_converter_error_is_reported() {
    let err = from_xml_str::<Palette>("<palette><color>red</color></palette>").unwrap_err();
    match err {
        BindError::Parse(ParseError::Conversion { field, source, .. }) => {
            assert_eq!(field, "color");
            assert_eq!(source.to_string(), "not a color: red");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_root_name_is_not_checked() -> Result<()> {
    let a: Numbers = from_xml_str("<anything><v>1</v></anything>")?;
    assert_eq!(a.values, vec![1]);
    Ok(())
}

#[test]
fn test_root_scalar() -> Result<()> {
    let n: i64 = from_xml_str("<?xml version=\"1.0\"?>\n<n>-17</n>\n")?;
    assert_eq!(n, -17);
    Ok(())
}

#[test]
fn test_empty_root_scalar_is_invalid() {
    let err = from_xml_str::<i32>("<n/>").unwrap_err();
    assert!(matches!(
        err,
        BindError::Parse(ParseError::InvalidElement { ref name, .. }) if name == "n"
    ));
}

#[test]
fn test_trailing_content_fails() {
    let err = from_xml_str::<i32>("<n>1</n><n>2</n>").unwrap_err();
    assert!(matches!(err, BindError::Parse(ParseError::TrailingContent { .. })), "{}", err);
}

#[test]
fn test_entities_in_text_and_attributes() -> Result<()> {
    let address: Address =
        from_xml_str(r#"<a type="&quot;main&quot;"><street>Fish &amp; Chips &#8364;</street></a>"#)?;
    assert_eq!(address.kind.as_deref(), Some("\"main\""));
    assert_eq!(address.street.as_deref(), Some("Fish & Chips \u{20ac}"));
    Ok(())
}

#[test]
fn test_cdata_is_ordinary_text() -> Result<()> {
    let address: Address = from_xml_str("<a><street><![CDATA[<Main>]]></street></a>")?;
    assert_eq!(address.street.as_deref(), Some("<Main>"));
    Ok(())
}

#[test]
fn test_namespaces_are_not_processed() -> Result<()> {
    let xml = r#"<a xmlns="urn:x" xmlns:p="urn:p"><p:street>Ignored</p:street><street>Kept</street></a>"#;
    let address: Address = from_xml_str(xml)?;
    assert_eq!(address.street.as_deref(), Some("Kept"));
    Ok(())
}

#[test]
fn test_malformed_xml_is_reported() {
    let err = from_xml_str::<Address>("<a><street>Main</city></a>").unwrap_err();
    assert!(matches!(err, BindError::Parse(ParseError::Xml { .. })), "{}", err);
}

#[test]
fn test_unterminated_document_fails() {
    let err = from_xml_str::<Address>("<a><street>Main</street>").unwrap_err();
    assert!(err.is_parse(), "{}", err);
}

#[test]
fn test_slice_and_reader_inputs() -> Result<()> {
    let xml = "<r><v>4</v><v>5</v></r>";
    let from_slice: Numbers = from_xml_slice(xml.as_bytes())?;
    let from_reader: Numbers = from_xml_reader(std::io::Cursor::new(xml.to_string()))?;
    assert_eq!(from_slice.values, from_reader.values);

    let err = from_xml_slice::<Numbers>(&[b'<', b'r', b'>', 0xff, b'<', b'/', b'r', b'>']).unwrap_err();
    assert!(matches!(err, BindError::Parse(ParseError::InvalidUtf8(_))));
    Ok(())
}
