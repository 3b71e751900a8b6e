//! SVG and MathML tables used while building foreign subtrees.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
//!
//! The tokenizer lowercases every name, while SVG names are case sensitive.
//! These tables restore the camel-cased spelling so a `viewBox` written in the
//! source comes back out as `viewBox`. Prefixed attributes such as
//! `xlink:href` keep their literal names; the DOM has no namespaced attributes.

use wombat_dom::Namespace;

use crate::tokenizer::Attribute;

/// [§ 13.2.6.3 Adjust SVG attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-svg-attributes)
const SVG_ATTRIBUTE_ADJUSTMENTS: &[(&str, &str)] = &[
    ("attributename", "attributeName"),
    ("attributetype", "attributeType"),
    ("basefrequency", "baseFrequency"),
    ("baseprofile", "baseProfile"),
    ("calcmode", "calcMode"),
    ("clippathunits", "clipPathUnits"),
    ("diffuseconstant", "diffuseConstant"),
    ("edgemode", "edgeMode"),
    ("filterunits", "filterUnits"),
    ("glyphref", "glyphRef"),
    ("gradienttransform", "gradientTransform"),
    ("gradientunits", "gradientUnits"),
    ("kernelmatrix", "kernelMatrix"),
    ("kernelunitlength", "kernelUnitLength"),
    ("keypoints", "keyPoints"),
    ("keysplines", "keySplines"),
    ("keytimes", "keyTimes"),
    ("lengthadjust", "lengthAdjust"),
    ("limitingconeangle", "limitingConeAngle"),
    ("markerheight", "markerHeight"),
    ("markerunits", "markerUnits"),
    ("markerwidth", "markerWidth"),
    ("maskcontentunits", "maskContentUnits"),
    ("maskunits", "maskUnits"),
    ("numoctaves", "numOctaves"),
    ("pathlength", "pathLength"),
    ("patterncontentunits", "patternContentUnits"),
    ("patterntransform", "patternTransform"),
    ("patternunits", "patternUnits"),
    ("pointsatx", "pointsAtX"),
    ("pointsaty", "pointsAtY"),
    ("pointsatz", "pointsAtZ"),
    ("preservealpha", "preserveAlpha"),
    ("preserveaspectratio", "preserveAspectRatio"),
    ("primitiveunits", "primitiveUnits"),
    ("refx", "refX"),
    ("refy", "refY"),
    ("repeatcount", "repeatCount"),
    ("repeatdur", "repeatDur"),
    ("requiredextensions", "requiredExtensions"),
    ("requiredfeatures", "requiredFeatures"),
    ("specularconstant", "specularConstant"),
    ("specularexponent", "specularExponent"),
    ("spreadmethod", "spreadMethod"),
    ("startoffset", "startOffset"),
    ("stddeviation", "stdDeviation"),
    ("stitchtiles", "stitchTiles"),
    ("surfacescale", "surfaceScale"),
    ("systemlanguage", "systemLanguage"),
    ("tablevalues", "tableValues"),
    ("targetx", "targetX"),
    ("targety", "targetY"),
    ("textlength", "textLength"),
    ("viewbox", "viewBox"),
    ("viewtarget", "viewTarget"),
    ("xchannelselector", "xChannelSelector"),
    ("ychannelselector", "yChannelSelector"),
    ("zoomandpan", "zoomAndPan"),
];

/// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
/// "If the adjusted current node is an element in the SVG namespace, and the
/// token's tag name is one of the ones in the first column of the following
/// table, change the tag name to the name given in the corresponding cell in
/// the second column."
const SVG_TAG_NAME_ADJUSTMENTS: &[(&str, &str)] = &[
    ("altglyph", "altGlyph"),
    ("altglyphdef", "altGlyphDef"),
    ("altglyphitem", "altGlyphItem"),
    ("animatecolor", "animateColor"),
    ("animatemotion", "animateMotion"),
    ("animatetransform", "animateTransform"),
    ("clippath", "clipPath"),
    ("feblend", "feBlend"),
    ("fecolormatrix", "feColorMatrix"),
    ("fecomponenttransfer", "feComponentTransfer"),
    ("fecomposite", "feComposite"),
    ("feconvolvematrix", "feConvolveMatrix"),
    ("fediffuselighting", "feDiffuseLighting"),
    ("fedisplacementmap", "feDisplacementMap"),
    ("fedistantlight", "feDistantLight"),
    ("fedropshadow", "feDropShadow"),
    ("feflood", "feFlood"),
    ("fefunca", "feFuncA"),
    ("fefuncb", "feFuncB"),
    ("fefuncg", "feFuncG"),
    ("fefuncr", "feFuncR"),
    ("fegaussianblur", "feGaussianBlur"),
    ("feimage", "feImage"),
    ("femerge", "feMerge"),
    ("femergenode", "feMergeNode"),
    ("femorphology", "feMorphology"),
    ("feoffset", "feOffset"),
    ("fepointlight", "fePointLight"),
    ("fespecularlighting", "feSpecularLighting"),
    ("fespotlight", "feSpotLight"),
    ("fetile", "feTile"),
    ("feturbulence", "feTurbulence"),
    ("foreignobject", "foreignObject"),
    ("glyphref", "glyphRef"),
    ("lineargradient", "linearGradient"),
    ("radialgradient", "radialGradient"),
    ("textpath", "textPath"),
];

fn lookup(table: &[(&str, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find_map(|&(from, to)| (from == name).then_some(to))
}

/// The SVG spelling of a lowercased tag name.
#[must_use]
pub fn adjust_svg_tag_name(name: &str) -> String {
    lookup(SVG_TAG_NAME_ADJUSTMENTS, name).map_or_else(|| name.to_string(), str::to_string)
}

/// [§ 13.2.6.3 Adjust SVG attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-svg-attributes)
pub fn adjust_svg_attributes(attributes: &mut [Attribute]) {
    for attr in attributes {
        if let Some(adjusted) = lookup(SVG_ATTRIBUTE_ADJUSTMENTS, &attr.name) {
            attr.name = adjusted.to_string();
        }
    }
}

/// [§ 13.2.6.3 Adjust MathML attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-mathml-attributes)
///
/// "if the attribute's name is 'definitionurl', set the attribute's name to
/// 'definitionURL'."
pub fn adjust_mathml_attributes(attributes: &mut [Attribute]) {
    for attr in attributes {
        if attr.name == "definitionurl" {
            attr.name = "definitionURL".to_string();
        }
    }
}

/// Apply the tag name and attribute adjustments for an element created in
/// `namespace`.
pub fn adjust_for_namespace(
    namespace: Namespace,
    name: &str,
    attributes: &mut [Attribute],
) -> String {
    match namespace {
        Namespace::Svg => {
            adjust_svg_attributes(attributes);
            adjust_svg_tag_name(name)
        }
        Namespace::MathMl => {
            adjust_mathml_attributes(attributes);
            name.to_string()
        }
        Namespace::Html => name.to_string(),
    }
}

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#mathml-text-integration-point)
/// "A node is a MathML text integration point if it is one of the following
/// elements: mi, mo, mn, ms, mtext."
#[must_use]
pub fn is_mathml_text_integration_point(namespace: Namespace, tag_name: &str) -> bool {
    namespace == Namespace::MathMl && matches!(tag_name, "mi" | "mo" | "mn" | "ms" | "mtext")
}

/// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
///
/// SVG `foreignObject`, `desc` and `title`, plus a MathML `annotation-xml`
/// whose `encoding` is an HTML type.
#[must_use]
pub fn is_html_integration_point(
    namespace: Namespace,
    tag_name: &str,
    encoding: Option<&str>,
) -> bool {
    match namespace {
        Namespace::Svg => matches!(tag_name, "foreignObject" | "desc" | "title"),
        Namespace::MathMl => {
            tag_name == "annotation-xml"
                && encoding.is_some_and(|encoding| {
                    encoding.eq_ignore_ascii_case("text/html")
                        || encoding.eq_ignore_ascii_case("application/xhtml+xml")
                })
        }
        Namespace::Html => false,
    }
}

/// [§ 13.2.6.5](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
///
/// HTML start tags that close every open foreign element before being
/// processed as ordinary HTML. `font` only breaks out when it carries a
/// `color`, `face` or `size` attribute.
#[must_use]
pub fn breaks_out_of_foreign_content(tag_name: &str, attributes: &[Attribute]) -> bool {
    match tag_name {
        "b" | "big" | "blockquote" | "body" | "br" | "center" | "code" | "dd" | "div" | "dl"
        | "dt" | "em" | "embed" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "head" | "hr"
        | "i" | "img" | "li" | "listing" | "menu" | "meta" | "nobr" | "ol" | "p" | "pre"
        | "ruby" | "s" | "small" | "span" | "strong" | "strike" | "sub" | "sup" | "table"
        | "tt" | "u" | "ul" | "var" => true,
        "font" => attributes
            .iter()
            .any(|attr| matches!(attr.name.as_str(), "color" | "face" | "size")),
        _ => false,
    }
}
