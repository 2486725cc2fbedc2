use std::{io::Write, sync::Arc, time::Duration};

use flate2::{write::GzEncoder, Compression};
use modcatalog::{
    fetch::{Endpoint, Response, Route, ScriptedTransport},
    manifest::Platform,
    CatalogService, Endpoints, InstallState, ManifestEntry, Tag,
};
use tokio_util::sync::CancellationToken;
use url::Url;

const MOD_LINKS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ModLinks xmlns="https://github.com/HollowKnight-Modding/HollowKnight.ModLinks/HollowKnight.ModManager">
    <Manifest>
        <Name>NormalEx</Name>
        <Description>An example</Description>
        <Version>1.0</Version>
        <Link SHA256="C0FFEE">https://example.com/NormalEx.zip</Link>
        <Dependencies />
        <Repository>https://github.com/fifty-six/HollowKnight.QoL</Repository>
        <Tags>
            <Tag>Boss</Tag>
            <Tag>Nonsense</Tag>
            <Tag>Utility</Tag>
        </Tags>
        <Authors>
            <Author>56</Author>
        </Authors>
    </Manifest>
</ModLinks>"#;

const API_LINKS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ApiLinks>
    <Manifest>
        <Version>77</Version>
        <Links>
            <Windows SHA256="W">https://example.com/api-win.zip</Windows>
            <Mac SHA256="M">https://example.com/api-mac.zip</Mac>
            <Linux SHA256="L">https://example.com/api-linux.zip</Linux>
        </Links>
    </Manifest>
</ApiLinks>"#;

const OVERLAY: &str =
    r#"{"NormalEx": {"displayName": "标准示例", "descriptionSupplement": "补充说明"}}"#;

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn endpoints() -> Endpoints {
    let url = |s: &str| Url::parse(s).unwrap();
    Endpoints {
        mod_links: Endpoint::new(
            url("https://raw.example/ModLinks.xml"),
            url("https://cdn.example/ModLinks.xml"),
        ),
        api_links: Endpoint::new(
            url("https://raw.example/ApiLinks.xml"),
            url("https://cdn.example/ApiLinks.xml"),
        ),
        overlay: Endpoint::single(url("https://names.example/names.json")),
    }
}

#[tokio::test]
async fn localized_installed_mod_end_to_end() {
    let transport = ScriptedTransport::new()
        .hang("https://raw.example/ModLinks.xml")
        .respond("https://cdn.example/ModLinks.xml", MOD_LINKS)
        .respond("https://raw.example/ApiLinks.xml", API_LINKS)
        .route(
            "https://names.example/names.json",
            Route::Respond {
                response: Response {
                    status: 200,
                    content_encoding: Some("gzip".into()),
                    body: gzip(OVERLAY),
                },
                delay: Duration::ZERO,
            },
        );
    let resolver = |entry: &ManifestEntry| {
        if entry.name == "NormalEx" {
            InstallState::Installed {
                enabled: true,
                version: "1.0".parse().unwrap(),
                update_available: false,
            }
        } else {
            InstallState::NotInstalled
        }
    };

    let service = CatalogService::new(Arc::new(transport), Arc::new(resolver), endpoints())
        .with_platform(Platform::Windows)
        .with_timeout(Duration::from_millis(200));
    let catalog = service.refresh(&CancellationToken::new()).await.unwrap();

    assert_eq!(catalog.len(), 1);
    let item = &catalog.items()[0];
    assert_eq!(item.name, "NormalEx");
    assert_eq!(item.display_name, "标准示例");
    assert_eq!(item.description, "An example\n\n补充说明");
    assert!(item.description.ends_with("补充说明"));
    assert_eq!(item.tags.iter().copied().collect::<Vec<_>>(), vec![Tag::Boss, Tag::Utility]);
    assert_eq!(item.link, "https://example.com/NormalEx.zip");
    assert_eq!(
        item.state,
        InstallState::Installed {
            enabled: true,
            version: "1.0".parse().unwrap(),
            update_available: false,
        }
    );

    let api = catalog.api();
    assert_eq!(api.version, 77);
    assert_eq!(api.link, "https://example.com/api-win.zip");
    assert_eq!(api.sha256, "W");
}

#[tokio::test]
async fn refresh_replaces_rather_than_mutates() {
    let transport = ScriptedTransport::new()
        .respond("https://raw.example/ModLinks.xml", MOD_LINKS)
        .respond("https://raw.example/ApiLinks.xml", API_LINKS)
        .respond("https://names.example/names.json", OVERLAY);
    let service = CatalogService::new(
        Arc::new(transport),
        Arc::new(modcatalog::install::NothingInstalled),
        endpoints(),
    )
    .with_platform(Platform::Linux);

    let first = service.refresh(&CancellationToken::new()).await.unwrap();
    let second = service.refresh(&CancellationToken::new()).await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.items(), second.items());
    assert_eq!(second.items()[0].description, "An example\n\n补充说明");
    assert!(Arc::ptr_eq(&service.current().unwrap(), &second));
}
