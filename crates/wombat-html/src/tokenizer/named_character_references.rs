//! Named character reference table.
//!
//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html)
//!
//! The full table has 2,231 entries. This one carries every legacy entity
//! (the ones recognised without a trailing semicolon), the HTML 4 set, and a
//! handful of common HTML5 additions.

/// Length in bytes of the longest name in [`NAMED_CHARACTER_REFERENCES`].
pub const LONGEST_NAME: usize = 9;

/// Entity names (without the leading `&`) and their replacement text,
/// sorted by byte order so lookups can binary search.
pub static NAMED_CHARACTER_REFERENCES: &[(&str, &str)] = &[
    ("AElig", "\u{c6}"),
    ("AElig;", "\u{c6}"),
    ("AMP", "&"),
    ("Aacute", "\u{c1}"),
    ("Aacute;", "\u{c1}"),
    ("Acirc", "\u{c2}"),
    ("Acirc;", "\u{c2}"),
    ("Agrave", "\u{c0}"),
    ("Agrave;", "\u{c0}"),
    ("Alpha;", "\u{391}"),
    ("Aring", "\u{c5}"),
    ("Aring;", "\u{c5}"),
    ("Atilde", "\u{c3}"),
    ("Atilde;", "\u{c3}"),
    ("Auml", "\u{c4}"),
    ("Auml;", "\u{c4}"),
    ("Beta;", "\u{392}"),
    ("COPY", "\u{a9}"),
    ("Ccedil", "\u{c7}"),
    ("Ccedil;", "\u{c7}"),
    ("Chi;", "\u{3a7}"),
    ("Dagger;", "\u{2021}"),
    ("Delta;", "\u{394}"),
    ("ETH", "\u{d0}"),
    ("ETH;", "\u{d0}"),
    ("Eacute", "\u{c9}"),
    ("Eacute;", "\u{c9}"),
    ("Ecirc", "\u{ca}"),
    ("Ecirc;", "\u{ca}"),
    ("Egrave", "\u{c8}"),
    ("Egrave;", "\u{c8}"),
    ("Epsilon;", "\u{395}"),
    ("Eta;", "\u{397}"),
    ("Euml", "\u{cb}"),
    ("Euml;", "\u{cb}"),
    ("GT", ">"),
    ("Gamma;", "\u{393}"),
    ("Hat;", "^"),
    ("Iacute", "\u{cd}"),
    ("Iacute;", "\u{cd}"),
    ("Icirc", "\u{ce}"),
    ("Icirc;", "\u{ce}"),
    ("Igrave", "\u{cc}"),
    ("Igrave;", "\u{cc}"),
    ("Iota;", "\u{399}"),
    ("Iuml", "\u{cf}"),
    ("Iuml;", "\u{cf}"),
    ("Kappa;", "\u{39a}"),
    ("LT", "<"),
    ("Lambda;", "\u{39b}"),
    ("Mu;", "\u{39c}"),
    ("NewLine;", "\n"),
    ("NotEqual;", "\u{2260}"),
    ("Ntilde", "\u{d1}"),
    ("Ntilde;", "\u{d1}"),
    ("Nu;", "\u{39d}"),
    ("OElig;", "\u{152}"),
    ("Oacute", "\u{d3}"),
    ("Oacute;", "\u{d3}"),
    ("Ocirc", "\u{d4}"),
    ("Ocirc;", "\u{d4}"),
    ("Ograve", "\u{d2}"),
    ("Ograve;", "\u{d2}"),
    ("Omega;", "\u{3a9}"),
    ("Omicron;", "\u{39f}"),
    ("Oslash", "\u{d8}"),
    ("Oslash;", "\u{d8}"),
    ("Otilde", "\u{d5}"),
    ("Otilde;", "\u{d5}"),
    ("Ouml", "\u{d6}"),
    ("Ouml;", "\u{d6}"),
    ("Phi;", "\u{3a6}"),
    ("Pi;", "\u{3a0}"),
    ("Prime;", "\u{2033}"),
    ("Psi;", "\u{3a8}"),
    ("QUOT", "\""),
    ("REG", "\u{ae}"),
    ("Rho;", "\u{3a1}"),
    ("Scaron;", "\u{160}"),
    ("Sigma;", "\u{3a3}"),
    ("THORN", "\u{de}"),
    ("THORN;", "\u{de}"),
    ("Tab;", "\t"),
    ("Tau;", "\u{3a4}"),
    ("Theta;", "\u{398}"),
    ("Uacute", "\u{da}"),
    ("Uacute;", "\u{da}"),
    ("Ucirc", "\u{db}"),
    ("Ucirc;", "\u{db}"),
    ("Ugrave", "\u{d9}"),
    ("Ugrave;", "\u{d9}"),
    ("Upsilon;", "\u{3a5}"),
    ("Uuml", "\u{dc}"),
    ("Uuml;", "\u{dc}"),
    ("Xi;", "\u{39e}"),
    ("Yacute", "\u{dd}"),
    ("Yacute;", "\u{dd}"),
    ("Yuml;", "\u{178}"),
    ("Zeta;", "\u{396}"),
    ("aacute", "\u{e1}"),
    ("aacute;", "\u{e1}"),
    ("acirc", "\u{e2}"),
    ("acirc;", "\u{e2}"),
    ("acute", "\u{b4}"),
    ("acute;", "\u{b4}"),
    ("aelig", "\u{e6}"),
    ("aelig;", "\u{e6}"),
    ("agrave", "\u{e0}"),
    ("agrave;", "\u{e0}"),
    ("alefsym;", "\u{2135}"),
    ("alpha;", "\u{3b1}"),
    ("amp", "&"),
    ("amp;", "&"),
    ("and;", "\u{2227}"),
    ("ang;", "\u{2220}"),
    ("apos;", "'"),
    ("aring", "\u{e5}"),
    ("aring;", "\u{e5}"),
    ("ast;", "*"),
    ("asymp;", "\u{2248}"),
    ("atilde", "\u{e3}"),
    ("atilde;", "\u{e3}"),
    ("auml", "\u{e4}"),
    ("auml;", "\u{e4}"),
    ("bdquo;", "\u{201e}"),
    ("beta;", "\u{3b2}"),
    ("bigstar;", "\u{2605}"),
    ("brvbar", "\u{a6}"),
    ("brvbar;", "\u{a6}"),
    ("bsol;", "\\"),
    ("bull;", "\u{2022}"),
    ("cap;", "\u{2229}"),
    ("ccedil", "\u{e7}"),
    ("ccedil;", "\u{e7}"),
    ("cedil", "\u{b8}"),
    ("cedil;", "\u{b8}"),
    ("cent", "\u{a2}"),
    ("cent;", "\u{a2}"),
    ("check;", "\u{2713}"),
    ("chi;", "\u{3c7}"),
    ("circ;", "\u{2c6}"),
    ("clubs;", "\u{2663}"),
    ("colon;", ":"),
    ("comma;", ","),
    ("commat;", "@"),
    ("cong;", "\u{2245}"),
    ("copy", "\u{a9}"),
    ("copy;", "\u{a9}"),
    ("crarr;", "\u{21b5}"),
    ("cross;", "\u{2717}"),
    ("cup;", "\u{222a}"),
    ("curren", "\u{a4}"),
    ("curren;", "\u{a4}"),
    ("dArr;", "\u{21d3}"),
    ("dagger;", "\u{2020}"),
    ("darr;", "\u{2193}"),
    ("dash;", "\u{2010}"),
    ("deg", "\u{b0}"),
    ("deg;", "\u{b0}"),
    ("delta;", "\u{3b4}"),
    ("diams;", "\u{2666}"),
    ("divide", "\u{f7}"),
    ("divide;", "\u{f7}"),
    ("dollar;", "$"),
    ("eacute", "\u{e9}"),
    ("eacute;", "\u{e9}"),
    ("ecirc", "\u{ea}"),
    ("ecirc;", "\u{ea}"),
    ("egrave", "\u{e8}"),
    ("egrave;", "\u{e8}"),
    ("empty;", "\u{2205}"),
    ("emsp;", "\u{2003}"),
    ("ensp;", "\u{2002}"),
    ("epsilon;", "\u{3b5}"),
    ("equals;", "="),
    ("equiv;", "\u{2261}"),
    ("eta;", "\u{3b7}"),
    ("eth", "\u{f0}"),
    ("eth;", "\u{f0}"),
    ("euml", "\u{eb}"),
    ("euml;", "\u{eb}"),
    ("euro;", "\u{20ac}"),
    ("excl;", "!"),
    ("exist;", "\u{2203}"),
    ("female;", "\u{2640}"),
    ("fjlig;", "fj"),
    ("fnof;", "\u{192}"),
    ("forall;", "\u{2200}"),
    ("frac12", "\u{bd}"),
    ("frac12;", "\u{bd}"),
    ("frac13;", "\u{2153}"),
    ("frac14", "\u{bc}"),
    ("frac14;", "\u{bc}"),
    ("frac23;", "\u{2154}"),
    ("frac34", "\u{be}"),
    ("frac34;", "\u{be}"),
    ("frasl;", "\u{2044}"),
    ("gamma;", "\u{3b3}"),
    ("ge;", "\u{2265}"),
    ("grave;", "`"),
    ("gt", ">"),
    ("gt;", ">"),
    ("hArr;", "\u{21d4}"),
    ("half;", "\u{bd}"),
    ("harr;", "\u{2194}"),
    ("hearts;", "\u{2665}"),
    ("hellip;", "\u{2026}"),
    ("hyphen;", "\u{2010}"),
    ("iacute", "\u{ed}"),
    ("iacute;", "\u{ed}"),
    ("icirc", "\u{ee}"),
    ("icirc;", "\u{ee}"),
    ("iexcl", "\u{a1}"),
    ("iexcl;", "\u{a1}"),
    ("igrave", "\u{ec}"),
    ("igrave;", "\u{ec}"),
    ("image;", "\u{2111}"),
    ("infin;", "\u{221e}"),
    ("int;", "\u{222b}"),
    ("iota;", "\u{3b9}"),
    ("iquest", "\u{bf}"),
    ("iquest;", "\u{bf}"),
    ("isin;", "\u{2208}"),
    ("iuml", "\u{ef}"),
    ("iuml;", "\u{ef}"),
    ("kappa;", "\u{3ba}"),
    ("lArr;", "\u{21d0}"),
    ("lambda;", "\u{3bb}"),
    ("lang;", "\u{2329}"),
    ("laquo", "\u{ab}"),
    ("laquo;", "\u{ab}"),
    ("larr;", "\u{2190}"),
    ("lbrace;", "{"),
    ("lbrack;", "["),
    ("lceil;", "\u{2308}"),
    ("ldquo;", "\u{201c}"),
    ("le;", "\u{2264}"),
    ("lfloor;", "\u{230a}"),
    ("lowast;", "\u{2217}"),
    ("lowbar;", "_"),
    ("loz;", "\u{25ca}"),
    ("lpar;", "("),
    ("lrm;", "\u{200e}"),
    ("lsaquo;", "\u{2039}"),
    ("lsquo;", "\u{2018}"),
    ("lt", "<"),
    ("lt;", "<"),
    ("macr", "\u{af}"),
    ("macr;", "\u{af}"),
    ("male;", "\u{2642}"),
    ("mdash;", "\u{2014}"),
    ("micro", "\u{b5}"),
    ("micro;", "\u{b5}"),
    ("middot", "\u{b7}"),
    ("middot;", "\u{b7}"),
    ("minus;", "\u{2212}"),
    ("mu;", "\u{3bc}"),
    ("nabla;", "\u{2207}"),
    ("nbsp", "\u{a0}"),
    ("nbsp;", "\u{a0}"),
    ("ndash;", "\u{2013}"),
    ("ne;", "\u{2260}"),
    ("ni;", "\u{220b}"),
    ("not", "\u{ac}"),
    ("not;", "\u{ac}"),
    ("notin;", "\u{2209}"),
    ("nsub;", "\u{2284}"),
    ("ntilde", "\u{f1}"),
    ("ntilde;", "\u{f1}"),
    ("nu;", "\u{3bd}"),
    ("num;", "#"),
    ("oacute", "\u{f3}"),
    ("oacute;", "\u{f3}"),
    ("ocirc", "\u{f4}"),
    ("ocirc;", "\u{f4}"),
    ("oelig;", "\u{153}"),
    ("ograve", "\u{f2}"),
    ("ograve;", "\u{f2}"),
    ("oline;", "\u{203e}"),
    ("omega;", "\u{3c9}"),
    ("omicron;", "\u{3bf}"),
    ("oplus;", "\u{2295}"),
    ("or;", "\u{2228}"),
    ("ordf", "\u{aa}"),
    ("ordf;", "\u{aa}"),
    ("ordm", "\u{ba}"),
    ("ordm;", "\u{ba}"),
    ("oslash", "\u{f8}"),
    ("oslash;", "\u{f8}"),
    ("otilde", "\u{f5}"),
    ("otilde;", "\u{f5}"),
    ("otimes;", "\u{2297}"),
    ("ouml", "\u{f6}"),
    ("ouml;", "\u{f6}"),
    ("para", "\u{b6}"),
    ("para;", "\u{b6}"),
    ("part;", "\u{2202}"),
    ("percnt;", "%"),
    ("period;", "."),
    ("permil;", "\u{2030}"),
    ("perp;", "\u{22a5}"),
    ("phi;", "\u{3c6}"),
    ("phone;", "\u{260e}"),
    ("pi;", "\u{3c0}"),
    ("piv;", "\u{3d6}"),
    ("plus;", "+"),
    ("plusmn", "\u{b1}"),
    ("plusmn;", "\u{b1}"),
    ("pound", "\u{a3}"),
    ("pound;", "\u{a3}"),
    ("prime;", "\u{2032}"),
    ("prod;", "\u{220f}"),
    ("prop;", "\u{221d}"),
    ("psi;", "\u{3c8}"),
    ("quest;", "?"),
    ("quot", "\""),
    ("quot;", "\""),
    ("rArr;", "\u{21d2}"),
    ("radic;", "\u{221a}"),
    ("rang;", "\u{232a}"),
    ("raquo", "\u{bb}"),
    ("raquo;", "\u{bb}"),
    ("rarr;", "\u{2192}"),
    ("rbrace;", "}"),
    ("rbrack;", "]"),
    ("rceil;", "\u{2309}"),
    ("rdquo;", "\u{201d}"),
    ("real;", "\u{211c}"),
    ("reg", "\u{ae}"),
    ("reg;", "\u{ae}"),
    ("rfloor;", "\u{230b}"),
    ("rho;", "\u{3c1}"),
    ("rlm;", "\u{200f}"),
    ("rpar;", ")"),
    ("rsaquo;", "\u{203a}"),
    ("rsquo;", "\u{2019}"),
    ("sbquo;", "\u{201a}"),
    ("scaron;", "\u{161}"),
    ("sdot;", "\u{22c5}"),
    ("sect", "\u{a7}"),
    ("sect;", "\u{a7}"),
    ("semi;", ";"),
    ("shy", "\u{ad}"),
    ("shy;", "\u{ad}"),
    ("sigma;", "\u{3c3}"),
    ("sigmaf;", "\u{3c2}"),
    ("sim;", "\u{223c}"),
    ("sol;", "/"),
    ("spades;", "\u{2660}"),
    ("star;", "\u{2606}"),
    ("starf;", "\u{2605}"),
    ("sub;", "\u{2282}"),
    ("sube;", "\u{2286}"),
    ("sum;", "\u{2211}"),
    ("sup1", "\u{b9}"),
    ("sup1;", "\u{b9}"),
    ("sup2", "\u{b2}"),
    ("sup2;", "\u{b2}"),
    ("sup3", "\u{b3}"),
    ("sup3;", "\u{b3}"),
    ("sup;", "\u{2283}"),
    ("supe;", "\u{2287}"),
    ("szlig", "\u{df}"),
    ("szlig;", "\u{df}"),
    ("tau;", "\u{3c4}"),
    ("there4;", "\u{2234}"),
    ("theta;", "\u{3b8}"),
    ("thetasym;", "\u{3d1}"),
    ("thinsp;", "\u{2009}"),
    ("thorn", "\u{fe}"),
    ("thorn;", "\u{fe}"),
    ("tilde;", "\u{2dc}"),
    ("times", "\u{d7}"),
    ("times;", "\u{d7}"),
    ("trade;", "\u{2122}"),
    ("uArr;", "\u{21d1}"),
    ("uacute", "\u{fa}"),
    ("uacute;", "\u{fa}"),
    ("uarr;", "\u{2191}"),
    ("ucirc", "\u{fb}"),
    ("ucirc;", "\u{fb}"),
    ("ugrave", "\u{f9}"),
    ("ugrave;", "\u{f9}"),
    ("uml", "\u{a8}"),
    ("uml;", "\u{a8}"),
    ("upsih;", "\u{3d2}"),
    ("upsilon;", "\u{3c5}"),
    ("uuml", "\u{fc}"),
    ("uuml;", "\u{fc}"),
    ("verbar;", "|"),
    ("vert;", "|"),
    ("weierp;", "\u{2118}"),
    ("xi;", "\u{3be}"),
    ("yacute", "\u{fd}"),
    ("yacute;", "\u{fd}"),
    ("yen", "\u{a5}"),
    ("yen;", "\u{a5}"),
    ("yuml", "\u{ff}"),
    ("yuml;", "\u{ff}"),
    ("zeta;", "\u{3b6}"),
    ("zwj;", "\u{200d}"),
    ("zwnj;", "\u{200c}"),
];

/// Look up an exact entity name, including its trailing `;` if it has one.
///
/// ```
/// use wombat_html::tokenizer::named_character_references::lookup;
///
/// assert_eq!(lookup("amp;"), Some("&"));
/// assert_eq!(lookup("amp"), Some("&"));
/// assert_eq!(lookup("apos"), None);
/// ```
#[must_use]
pub fn lookup(name: &str) -> Option<&'static str> {
    NAMED_CHARACTER_REFERENCES
        .binary_search_by(|(candidate, _)| candidate.cmp(&name))
        .ok()
        .map(|index| NAMED_CHARACTER_REFERENCES[index].1)
}
