//! Country name → ISO 3166-1 alpha-2 lookup

/// Names are matched case-insensitively after whitespace normalisation.
/// Common alternative names are listed as separate rows.
const COUNTRIES: &[(&str, &str)] = &[
    ("afghanistan", "af"),
    ("albania", "al"),
    ("algeria", "dz"),
    ("andorra", "ad"),
    ("angola", "ao"),
    ("argentina", "ar"),
    ("armenia", "am"),
    ("australia", "au"),
    ("austria", "at"),
    ("azerbaijan", "az"),
    ("bahrain", "bh"),
    ("bangladesh", "bd"),
    ("belarus", "by"),
    ("belgium", "be"),
    ("bolivia", "bo"),
    ("bosnia and herzegovina", "ba"),
    ("brazil", "br"),
    ("bulgaria", "bg"),
    ("canada", "ca"),
    ("chile", "cl"),
    ("china", "cn"),
    ("colombia", "co"),
    ("costa rica", "cr"),
    ("croatia", "hr"),
    ("cuba", "cu"),
    ("cyprus", "cy"),
    ("czech republic", "cz"),
    ("czechia", "cz"),
    ("denmark", "dk"),
    ("dominican republic", "do"),
    ("ecuador", "ec"),
    ("egypt", "eg"),
    ("el salvador", "sv"),
    ("estonia", "ee"),
    ("finland", "fi"),
    ("france", "fr"),
    ("georgia", "ge"),
    ("germany", "de"),
    ("ghana", "gh"),
    ("greece", "gr"),
    ("guatemala", "gt"),
    ("honduras", "hn"),
    ("hong kong", "hk"),
    ("hungary", "hu"),
    ("iceland", "is"),
    ("india", "in"),
    ("indonesia", "id"),
    ("iran", "ir"),
    ("iraq", "iq"),
    ("ireland", "ie"),
    ("israel", "il"),
    ("italy", "it"),
    ("japan", "jp"),
    ("jordan", "jo"),
    ("kazakhstan", "kz"),
    ("kenya", "ke"),
    ("kuwait", "kw"),
    ("latvia", "lv"),
    ("lebanon", "lb"),
    ("lithuania", "lt"),
    ("luxembourg", "lu"),
    ("malaysia", "my"),
    ("malta", "mt"),
    ("mexico", "mx"),
    ("moldova", "md"),
    ("montenegro", "me"),
    ("morocco", "ma"),
    ("netherlands", "nl"),
    ("new zealand", "nz"),
    ("nicaragua", "ni"),
    ("nigeria", "ng"),
    ("north macedonia", "mk"),
    ("norway", "no"),
    ("pakistan", "pk"),
    ("panama", "pa"),
    ("paraguay", "py"),
    ("peru", "pe"),
    ("philippines", "ph"),
    ("poland", "pl"),
    ("portugal", "pt"),
    ("qatar", "qa"),
    ("romania", "ro"),
    ("russia", "ru"),
    ("russian federation", "ru"),
    ("saudi arabia", "sa"),
    ("serbia", "rs"),
    ("singapore", "sg"),
    ("slovakia", "sk"),
    ("slovenia", "si"),
    ("south africa", "za"),
    ("south korea", "kr"),
    ("spain", "es"),
    ("sweden", "se"),
    ("switzerland", "ch"),
    ("taiwan", "tw"),
    ("thailand", "th"),
    ("tunisia", "tn"),
    ("turkey", "tr"),
    ("turkiye", "tr"),
    ("ukraine", "ua"),
    ("united arab emirates", "ae"),
    ("united kingdom", "gb"),
    ("uk", "gb"),
    ("united states", "us"),
    ("united states of america", "us"),
    ("usa", "us"),
    ("uruguay", "uy"),
    ("venezuela", "ve"),
    ("vietnam", "vn"),
    ("zambia", "zm"),
    ("zimbabwe", "zw"),
];

/// Resolve a cleaned country name to its lowercase ISO-2 code
pub fn lookup_country_code(name: &str) -> Option<&'static str> {
    let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ");
    COUNTRIES
        .iter()
        .find(|(country, _)| country.eq_ignore_ascii_case(&normalized))
        .map(|(_, code)| *code)
}
