//! `#[derive(Shape)]` types registered on a workspace and resolved as
//! converter arguments.

use convtest_core::model::{ForeignMember, TypeMetadata};
use convtest_core::{
    ConverterFixer, ConverterUsage, MemberName, MemberResolver, ScaffoldConfig, Workspace,
};
use convtest_core_derive::Shape;

#[allow(dead_code)]
#[derive(Shape)]
#[shape(name = "Contracts.OrderDto")]
struct OrderDto {
    #[shape(rename = "Id")]
    id: i64,

    #[shape(rename = "Lines")]
    lines: Vec<String>,

    #[shape(rename = "Codes")]
    codes: [u8; 4],

    #[shape(skip)]
    etag: Option<String>,
}

#[allow(dead_code)]
#[derive(Shape)]
struct Envelope {
    body: &'static [u8],
    parts: Option<Vec<u32>>,
    header: Box<String>,
}

const SHOP: &str = r#"namespace Shop
{
    public class Order
    {
        public int Id { get; set; }
        public List<string> Lines { get; set; }
        public int[] Codes { get; set; }
    }

    public class OrderConverterTest : Converter<Order, Contracts.OrderDto>
    {
    }
}
"#;

#[test]
fn test_attributes_shape_members() {
    assert_eq!(OrderDto::type_name(), "Contracts.OrderDto");
    assert_eq!(
        OrderDto::members(),
        vec![
            ForeignMember::new("Id", false),
            ForeignMember::new("Lines", true),
            ForeignMember::new("Codes", false),
        ]
    );
}

#[test]
fn test_arrays_and_slices_are_scalar() {
    assert_eq!(Envelope::type_name(), "Envelope");
    let collections: Vec<(String, bool)> = Envelope::members()
        .into_iter()
        .map(|member| (member.name, member.collection))
        .collect();
    assert_eq!(
        collections,
        vec![
            ("body".to_string(), false),
            ("parts".to_string(), true),
            ("header".to_string(), false),
        ]
    );
}

#[test]
fn test_registered_type_resolves_as_converter_argument() {
    let mut workspace = Workspace::new();
    workspace.register::<OrderDto>();
    let doc = workspace.add_document("Shop.cs", SHOP).unwrap();

    let tree = workspace.tree(doc).unwrap();
    let usage = ConverterUsage::from_type(&tree.declarations[1].base_list[0]).unwrap();

    let config = ScaffoldConfig::default();
    let resolver = MemberResolver::new(&workspace, &config);
    let destination = resolver.resolve(doc, &usage.destination);
    assert_eq!(
        destination.members,
        vec![
            MemberName::new("Id"),
            MemberName::collection("Lines"),
            MemberName::new("Codes"),
        ]
    );

    let source = resolver.resolve(doc, &usage.source);
    assert_eq!(source.members, destination.members);
}

#[test]
fn test_fix_against_registered_type() {
    let mut workspace = Workspace::new();
    workspace.register::<OrderDto>();
    let doc = workspace.add_document("Shop.cs", SHOP).unwrap();

    let report = ConverterFixer::default().fix_all(&mut workspace, doc).unwrap();
    assert_eq!(report.applied, vec!["OrderConverterTest"]);

    let text = workspace.text(doc).unwrap();
    assert!(text.contains("public override void TestScenario(Order expected, Contracts.OrderDto tested)"));
    assert!(text.contains("Assert.That(tested.Id, Is.EqualTo(expected.Id));"));
    assert!(text.contains("Assert.That(tested.Lines.Length, Is.EqualTo(expected.Lines.Count));"));
    assert!(text.contains("Assert.That(tested.Codes, Is.EqualTo(expected.Codes));"));
    assert!(!text.contains("etag"));
}
